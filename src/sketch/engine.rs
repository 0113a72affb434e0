use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;

use super::dsu::DisjointSets;
use super::grid::SketchGrid;
use super::hashing::{CoordinateScheme, Coords, SeededCoordinates};
use super::nodes::NodeTable;
use super::types::{BatchOutcome, Edge, EdgeKey, SketchStats};
use crate::config::SketchConfig;
use crate::error::{EdgeRejection, Result, SketchError};

/// Everything a batch mutates besides connectivity.
#[derive(Debug)]
struct SketchState {
    grid: SketchGrid,
    nodes: NodeTable,
    observed: u64,
    rejected: u64,
    saturated_drops: u64,
}

/// Grid + union-find behind one synchronization boundary.
///
/// A batch is applied while holding the state write lock and the
/// connectivity lock, so readers never see a partly applied batch.
/// Lock order is always state, then connectivity.
pub struct SketchEngine<S: CoordinateScheme = SeededCoordinates> {
    config: SketchConfig,
    scheme: S,
    state: RwLock<SketchState>,
    components: Mutex<DisjointSets>,
}

impl SketchEngine<SeededCoordinates> {
    pub fn new(config: SketchConfig) -> Result<Self> {
        Self::with_scheme(config, SeededCoordinates)
    }
}

impl<S: CoordinateScheme> SketchEngine<S> {
    pub fn with_scheme(config: SketchConfig, scheme: S) -> Result<Self> {
        config.validate()?;
        info!(
            "[sketch] grid {}x{}x{} ({} cells), conflict limit {}",
            config.depth,
            config.width,
            config.width,
            config.total_cells(),
            config.conflict_limit
        );
        Ok(Self {
            config,
            scheme,
            state: RwLock::new(SketchState {
                grid: SketchGrid::new(&config),
                nodes: NodeTable::new(),
                observed: 0,
                rejected: 0,
                saturated_drops: 0,
            }),
            components: Mutex::new(DisjointSets::new()),
        })
    }

    #[inline]
    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    #[inline]
    fn locate(&self, source: &str, dest: &str) -> (Coords, u32) {
        self.scheme
            .coordinates_and_rank(source, dest, self.config.depth, self.config.width)
    }

    /// Applies a batch in arrival order. Invalid edges are skipped one by one
    /// and counted; they touch neither the grid nor connectivity.
    pub fn update(&self, batch: &[Edge]) -> BatchOutcome {
        // hashing is pure, do it before taking any lock
        let located: Vec<std::result::Result<(Coords, u32), EdgeRejection>> = batch
            .par_iter()
            .map(|e| {
                e.validate()?;
                Ok(self.locate(&e.source, &e.dest))
            })
            .collect();

        let mut outcome = BatchOutcome::default();
        let mut drops = 0u64;
        let mut state = self.state.write();
        let mut dsu = self.components.lock();

        for (i, (edge, loc)) in batch.iter().zip(located).enumerate() {
            let (coords, rank) = match loc {
                Ok(loc) => loc,
                Err(reason) => {
                    log_rejection(i, edge, reason);
                    outcome.rejected += 1;
                    continue;
                }
            };
            let Some((source, dest)) = state.nodes.intern_pair(&edge.source, &edge.dest) else {
                log_rejection(i, edge, EdgeRejection::NodeTableFull(state.nodes.limit()));
                outcome.rejected += 1;
                continue;
            };
            let key = EdgeKey::new(source, dest);
            dsu.union(key.source, key.dest);
            drops += state.grid.apply(key, &coords, rank, edge.weight) as u64;
            outcome.applied += 1;
        }

        state.observed += outcome.applied as u64;
        state.rejected += outcome.rejected as u64;
        state.saturated_drops += drops;
        debug!(
            "[update] applied={} rejected={} saturated_drops={}",
            outcome.applied, outcome.rejected, drops
        );
        outcome
    }

    /// Estimated cumulative weight of `source -> dest`; `0.0` if the edge is
    /// unseen or evicted at every round.
    pub fn edge_query(&self, source: &str, dest: &str) -> f64 {
        let state = self.state.read();
        let (Some(s), Some(d)) = (state.nodes.get(source), state.nodes.get(dest)) else {
            return 0.0;
        };
        let (coords, rank) = self.locate(source, dest);
        state
            .grid
            .estimate(EdgeKey::new(s, d), &coords, rank)
            .unwrap_or(0.0)
    }

    /// Whether any observed path connects the two nodes (direction ignored).
    /// Unseen nodes are never reachable.
    pub fn reachability_query(&self, source: &str, dest: &str) -> bool {
        let ids = {
            let state = self.state.read();
            (state.nodes.get(source), state.nodes.get(dest))
        };
        let (Some(s), Some(d)) = ids else {
            return false;
        };
        let mut dsu = self.components.lock();
        dsu.contains(s) && dsu.contains(d) && dsu.connected(s, d)
    }

    pub fn stats(&self) -> SketchStats {
        let state = self.state.read();
        let totals = state.grid.totals();
        let (tracked_nodes, components) = {
            let dsu = self.components.lock();
            (dsu.len(), dsu.component_count())
        };
        let total_cells = state.grid.total_cells();
        SketchStats {
            hash_functions: state.grid.depth(),
            total_edges: totals.total_edges,
            total_weight: totals.total_weight,
            occupied_cells: totals.occupied_cells,
            total_cells,
            occupancy_rate: if total_cells > 0 {
                totals.occupied_cells as f64 / total_cells as f64
            } else {
                0.0
            },
            observed_edges: state.observed,
            rejected_edges: state.rejected,
            saturated_drops: state.saturated_drops,
            tracked_nodes,
            components,
        }
    }
}

fn log_rejection(i: usize, edge: &Edge, reason: EdgeRejection) {
    warn!(
        "[update] rejected edge #{i} ({:?} -> {:?}): {}",
        edge.source,
        edge.dest,
        SketchError::from(reason)
    );
}
