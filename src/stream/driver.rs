use anyhow::{Result, anyhow, bail};
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use log::{debug, info};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use crate::config::DriverConfig;
use crate::sketch::{CoordinateScheme, Edge, SketchEngine, SketchStats};

#[derive(Debug, Clone, PartialEq)]
pub struct QueryReport {
    pub source: String,
    pub dest: String,
    pub edge_weight: f64,
    pub reachable: bool,
}

/// One consumer poll: every configured query plus a stats snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PollReport {
    pub queries: Vec<QueryReport>,
    pub stats: SketchStats,
}

pub fn poll<S: CoordinateScheme>(engine: &SketchEngine<S>, queries: &[(String, String)]) -> PollReport {
    let queries = queries
        .iter()
        .map(|(s, d)| QueryReport {
            source: s.clone(),
            dest: d.clone(),
            edge_weight: engine.edge_query(s, d),
            reachable: engine.reachability_query(s, d),
        })
        .collect();
    PollReport {
        queries,
        stats: engine.stats(),
    }
}

fn log_report(report: &PollReport) {
    let line = report
        .queries
        .iter()
        .map(|q| format!("{}->{} w={:.2} reach={}", q.source, q.dest, q.edge_weight, q.reachable))
        .join(" | ");
    info!(
        "[poll] {} | edges={} weight={:.2} occupied={}/{} ({:.2}%)",
        if line.is_empty() { "-".to_string() } else { line },
        report.stats.total_edges,
        report.stats.total_weight,
        report.stats.occupied_cells,
        report.stats.total_cells,
        report.stats.occupancy_rate * 100.0
    );
}

const GIB: f64 = (1u64 << 30) as f64;

/// Samples resident memory from `/proc/self/statm`; absent off Linux.
struct RssProbe {
    page_bytes: u64,
}

impl RssProbe {
    fn new() -> Option<Self> {
        let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        let page_bytes = u64::try_from(page).ok().filter(|&p| p > 0)?;
        let probe = Self { page_bytes };
        probe.sample().map(|_| probe)
    }

    fn sample(&self) -> Option<u64> {
        let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
        // fields: size resident shared ...
        let resident: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
        Some(resident.saturating_mul(self.page_bytes))
    }
}

/// Aborts ingestion once RSS passes the configured budget.
struct MemoryGuard {
    probe: Option<RssProbe>,
    budget: Option<u64>,
}

impl MemoryGuard {
    fn new(budget: Option<u64>) -> Self {
        Self {
            probe: RssProbe::new(),
            budget,
        }
    }

    fn check(&self, batch_id: usize) -> Result<()> {
        let Some(rss) = self.probe.as_ref().and_then(RssProbe::sample) else {
            return Ok(());
        };
        debug!("[mem] batch={} rss={:.3} GiB", batch_id, rss as f64 / GIB);
        match self.budget {
            Some(limit) if rss > limit => bail!(
                "RSS {:.2} GiB exceeded limit {:.2} GiB after batch {} (set via SKETCH_MAX_RSS_*)",
                rss as f64 / GIB,
                limit as f64 / GIB,
                batch_id
            ),
            _ => Ok(()),
        }
    }
}

/// Feeds `edges` in micro-batches while a poller thread queries the engine
/// every `poll_interval`. Returns a final poll taken after the last batch.
pub fn run_stream<S>(
    engine: Arc<SketchEngine<S>>,
    edges: &[Edge],
    queries: &[(String, String)],
    cfg: &DriverConfig,
) -> Result<PollReport>
where
    S: CoordinateScheme + 'static,
{
    let t0 = Instant::now();
    let (stop_tx, stop_rx) = mpsc::channel::<()>();

    let poller = {
        let engine = Arc::clone(&engine);
        let queries = queries.to_vec();
        let interval = cfg.poll_interval;
        thread::Builder::new()
            .name("sketch-poller".to_string())
            .spawn(move || {
                let mut polls = 0usize;
                loop {
                    log_report(&poll(&*engine, &queries));
                    polls += 1;
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        _ => break,
                    }
                }
                polls
            })?
    };

    let batch_size = cfg.batch_size.max(1);
    let n_batches = edges.len().div_ceil(batch_size);
    let pb = ProgressBar::new(n_batches as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} batches {msg}")?
            .progress_chars("=>-"),
    );

    let guard = MemoryGuard::new(cfg.memory_budget);
    let ingest = || -> Result<()> {
        for (batch_id, batch) in edges.chunks(batch_size).enumerate() {
            let outcome = engine.update(batch);
            let stats = engine.stats();
            info!(
                "Processed batch {} with {} edges (rejected {}) | hash functions={} total edges={} occupancy={:.2}%",
                batch_id,
                outcome.applied,
                outcome.rejected,
                stats.hash_functions,
                stats.total_edges,
                stats.occupancy_rate * 100.0
            );
            pb.set_message(format!("occupancy={:.2}%", stats.occupancy_rate * 100.0));
            pb.inc(1);
            guard.check(batch_id)?;
        }
        Ok(())
    };
    let ingested = ingest();
    pb.finish_and_clear();

    // stop the poller before surfacing any ingestion error
    drop(stop_tx);
    let polls = poller
        .join()
        .map_err(|_| anyhow!("poller thread panicked"))?;
    ingested?;

    let report = poll(&*engine, queries);
    info!(
        "[stream] {} edges in {} batches, {} polls, {:.3}s",
        edges.len(),
        n_batches,
        polls,
        t0.elapsed().as_secs_f64()
    );
    Ok(report)
}
