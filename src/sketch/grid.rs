use ndarray::Array3;
use ndarray::parallel::prelude::*;

use super::cell::{Cell, CellUpdate};
use super::hashing::Coords;
use super::types::EdgeKey;
use crate::config::SketchConfig;

/// Cell-level aggregate; the engine adds its own counters on top.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridTotals {
    pub occupied_cells: usize,
    pub total_edges: usize,
    pub total_weight: f64,
}

impl GridTotals {
    fn merge(self, other: Self) -> Self {
        Self {
            occupied_cells: self.occupied_cells + other.occupied_cells,
            total_edges: self.total_edges + other.total_edges,
            total_weight: self.total_weight + other.total_weight,
        }
    }
}

/// `depth × width × width` cells; shape never changes after construction.
#[derive(Debug)]
pub struct SketchGrid {
    cells: Array3<Cell>,
    conflict_limit: usize,
}

impl SketchGrid {
    pub fn new(cfg: &SketchConfig) -> Self {
        Self {
            cells: Array3::from_elem((cfg.depth, cfg.width, cfg.width), Cell::empty()),
            conflict_limit: cfg.conflict_limit,
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.cells.dim().0
    }
    #[inline]
    pub fn width(&self) -> usize {
        self.cells.dim().1
    }
    #[inline]
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn cell(&self, round: usize, x: usize, y: usize) -> &Cell {
        &self.cells[[round, x, y]]
    }

    /// Applies one observation at every round. Returns how many rounds
    /// dropped the edge because the tie list was already full.
    pub fn apply(&mut self, edge: EdgeKey, coords: &Coords, rank: u32, weight: f64) -> usize {
        let mut saturated = 0usize;
        for (round, &(x, y)) in coords.iter().enumerate() {
            let outcome = self.cells[[round, x, y]].observe(edge, rank, weight, self.conflict_limit);
            if outcome == CellUpdate::Saturated {
                saturated += 1;
            }
        }
        saturated
    }

    /// Min over rounds where `edge` survives; `None` if evicted everywhere.
    pub fn estimate(&self, edge: EdgeKey, coords: &Coords, rank: u32) -> Option<f64> {
        coords
            .iter()
            .enumerate()
            .filter_map(|(round, &(x, y))| self.cells[[round, x, y]].estimate(edge, rank))
            .reduce(f64::min)
    }

    pub fn totals(&self) -> GridTotals {
        self.cells
            .par_iter()
            .map(|c| {
                if c.is_occupied() {
                    GridTotals {
                        occupied_cells: 1,
                        total_edges: c.edges().len(),
                        total_weight: c.weight(),
                    }
                } else {
                    GridTotals::default()
                }
            })
            .reduce(GridTotals::default, GridTotals::merge)
    }
}
