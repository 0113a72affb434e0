use log::{info, warn};
use rayon::ThreadPoolBuilder;
use std::sync::Once;

/// Variables consulted, in order, before falling back to the core count.
const THREAD_HINTS: [&str; 5] = [
    "SKETCH_THREADS",
    "RAYON_NUM_THREADS",
    "SLURM_CPUS_PER_TASK",
    "SLURM_CPUS_ON_NODE",
    "OMP_NUM_THREADS",
];

#[derive(Debug, PartialEq, Eq)]
struct PoolSize {
    threads: usize,
    hint: &'static str,
}

impl PoolSize {
    /// First hint holding a positive integer; malformed hints are skipped.
    fn from_hints<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        THREAD_HINTS.iter().find_map(|&hint| {
            let threads = lookup(hint)?.trim().parse::<usize>().ok()?;
            (threads > 0).then_some(Self { threads, hint })
        })
    }

    fn detect() -> Self {
        Self::from_hints(|k| std::env::var(k).ok()).unwrap_or_else(|| Self {
            threads: std::thread::available_parallelism().map_or(1, |n| n.get()),
            hint: "available_parallelism",
        })
    }
}

/// Sizes the global rayon pool once; later calls are no-ops.
pub fn configure_thread_pool() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let size = PoolSize::detect();
        let built = ThreadPoolBuilder::new()
            .num_threads(size.threads)
            .thread_name(|i| format!("sketch-worker-{i}"))
            .build_global();
        match built {
            Ok(()) => info!("[threads] rayon pool = {} threads (hint: {})", size.threads, size.hint),
            Err(err) => warn!("[threads] keeping default rayon pool: {err}"),
        }
    });
}
