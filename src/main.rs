use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use sketcher::stream::{self, PollReport};
use sketcher::{DriverConfig, SketchConfig, SketchEngine, runtime};

#[derive(Debug, PartialEq)]
struct Args {
    input: PathBuf,
    queries: Vec<(String, String)>,
}

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Usage,
    Run(Args),
}

fn usage(code: i32) -> ! {
    let text = format!(
        "usage: sketcher <edges.txt> [src:dst ...]\n\
         env: SKETCH_WIDTH SKETCH_DEPTH SKETCH_CONFLICT_LIMIT SKETCH_BATCH_SIZE\n\
         \x20    SKETCH_POLL_MS SKETCH_MAX_RSS_{{BYTES,MB,GB}} SKETCH_THREADS"
    );
    if code == 0 {
        println!("{text}");
    } else {
        eprintln!("{text}");
    }
    std::process::exit(code);
}

fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(first) = args.next() else {
        return Ok(Command::Usage);
    };
    if first == "-h" || first == "--help" {
        return Ok(Command::Help);
    }
    let input = PathBuf::from(first);
    if !input.exists() {
        anyhow::bail!("input {:?} does not exist", input);
    }
    let queries = args
        .map(|spec| stream::parse_query(&spec))
        .collect::<Result<Vec<_>>>()?;
    Ok(Command::Run(Args { input, queries }))
}

fn print_report(report: &PollReport) {
    println!("--- sketch results ---");
    for q in &report.queries {
        println!("query {} -> {}", q.source, q.dest);
        println!("  estimated edge weight: {:.2}", q.edge_weight);
        println!("  reachable:             {}", q.reachable);
    }
    let s = &report.stats;
    println!("=== sketch statistics ===");
    println!("  hash functions (depth): {}", s.hash_functions);
    println!("  total edges stored:     {}", s.total_edges);
    println!("  total weight stored:    {:.2}", s.total_weight);
    println!("  occupied cells:         {}/{}", s.occupied_cells, s.total_cells);
    println!("  occupancy rate:         {:.2}%", s.occupancy_rate * 100.0);
    println!("  edges observed/rejected: {}/{}", s.observed_edges, s.rejected_edges);
    println!("  saturated drops:        {}", s.saturated_drops);
    println!("  nodes / components:     {}/{}", s.tracked_nodes, s.components);
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .init();
    runtime::configure_thread_pool();

    let args = match parse_args(env::args().skip(1))? {
        Command::Help => usage(0),
        Command::Usage => usage(1),
        Command::Run(args) => args,
    };
    let sketch_cfg = SketchConfig::from_env().context("sketch configuration")?;
    let driver_cfg = DriverConfig::from_env().context("driver configuration")?;
    log::info!(
        "[config] width={} depth={} conflict_limit={} batch_size={} queries={}",
        sketch_cfg.width,
        sketch_cfg.depth,
        sketch_cfg.conflict_limit,
        driver_cfg.batch_size,
        args.queries.len()
    );

    let edges = stream::read_edge_list(&args.input)?;
    log::info!("[input] {} edges from {}", edges.len(), args.input.display());

    let engine = Arc::new(SketchEngine::new(sketch_cfg)?);
    let report = stream::run_stream(engine, &edges, &args.queries, &driver_cfg)?;
    print_report(&report);
    Ok(())
}
