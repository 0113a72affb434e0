use smallvec::SmallVec;

use super::hashing::MAX_RANK;
use super::types::EdgeKey;

/// Ties kept inline before spilling; covers the usual conflict limits.
pub const INLINE_TIES: usize = 4;

/// What an observation did to a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellUpdate {
    /// Lower rank; previous occupants evicted.
    Replaced,
    /// Repeat of an edge already tied here.
    Accumulated,
    /// New distinct tie, list had room.
    Appended,
    /// New distinct tie, list full.
    Saturated,
    /// Higher rank; nothing changed.
    Dominated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    rank: u32,
    weight: f64,
    edges: SmallVec<[EdgeKey; INLINE_TIES]>,
}

impl Default for Cell {
    fn default() -> Self {
        Self::empty()
    }
}

impl Cell {
    pub fn empty() -> Self {
        Self {
            rank: MAX_RANK,
            weight: 0.0,
            edges: SmallVec::new(),
        }
    }

    #[inline]
    pub fn rank(&self) -> u32 {
        self.rank
    }
    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }
    #[inline]
    pub fn edges(&self) -> &[EdgeKey] {
        &self.edges
    }
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.rank != MAX_RANK
    }

    /// Compare-and-replace on `(rank, weight, edges)` as one unit.
    pub fn observe(&mut self, edge: EdgeKey, rank: u32, weight: f64, conflict_limit: usize) -> CellUpdate {
        use std::cmp::Ordering::*;
        match rank.cmp(&self.rank) {
            Less => {
                self.rank = rank;
                self.weight = weight;
                self.edges.clear();
                self.edges.push(edge);
                CellUpdate::Replaced
            }
            Equal => {
                if self.edges.contains(&edge) {
                    self.weight += weight;
                    CellUpdate::Accumulated
                } else if self.edges.len() < conflict_limit {
                    self.edges.push(edge);
                    self.weight += weight;
                    CellUpdate::Appended
                } else {
                    CellUpdate::Saturated
                }
            }
            Greater => CellUpdate::Dominated,
        }
    }

    /// Even share of the cell's weight if `edge` is tied here at `rank`.
    #[inline]
    pub fn estimate(&self, edge: EdgeKey, rank: u32) -> Option<f64> {
        if self.rank != rank || !self.edges.contains(&edge) {
            return None;
        }
        Some(self.weight / self.edges.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: EdgeKey = EdgeKey { source: 0, dest: 1 };
    const B: EdgeKey = EdgeKey { source: 2, dest: 3 };
    const C: EdgeKey = EdgeKey { source: 4, dest: 5 };

    #[test]
    fn empty_cell_is_sentinel() {
        let c = Cell::empty();
        assert!(!c.is_occupied());
        assert!(c.edges().is_empty());
        assert_eq!(c.estimate(A, 7), None);
    }

    #[test]
    fn lower_rank_replaces_everything() {
        let mut c = Cell::empty();
        assert_eq!(c.observe(A, 50, 2.0, 2), CellUpdate::Replaced);
        assert_eq!(c.observe(B, 50, 3.0, 2), CellUpdate::Appended);
        assert_eq!(c.observe(C, 10, 1.5, 2), CellUpdate::Replaced);
        assert_eq!(c.rank(), 10);
        assert_eq!(c.weight(), 1.5);
        assert_eq!(c.edges(), &[C]);
    }

    #[test]
    fn higher_rank_is_dominated() {
        let mut c = Cell::empty();
        c.observe(A, 10, 1.0, 2);
        assert_eq!(c.observe(B, 11, 9.0, 2), CellUpdate::Dominated);
        assert_eq!(c.weight(), 1.0);
        assert_eq!(c.edges(), &[A]);
    }

    #[test]
    fn saturated_cell_drops_new_ties_but_accumulates_repeats() {
        let mut c = Cell::empty();
        c.observe(A, 5, 1.0, 1);
        assert_eq!(c.observe(B, 5, 4.0, 1), CellUpdate::Saturated);
        assert_eq!(c.observe(A, 5, 2.0, 1), CellUpdate::Accumulated);
        assert_eq!(c.weight(), 3.0);
        assert_eq!(c.edges(), &[A]);
        assert_eq!(c.estimate(B, 5), None);
    }

    #[test]
    fn estimate_splits_evenly() {
        let mut c = Cell::empty();
        c.observe(A, 5, 1.0, 3);
        c.observe(B, 5, 3.0, 3);
        assert_eq!(c.estimate(A, 5), Some(2.0));
        assert_eq!(c.estimate(B, 5), Some(2.0));
        assert_eq!(c.estimate(A, 6), None);
    }

    #[test]
    fn spills_past_inline_capacity() {
        let mut c = Cell::empty();
        for s in 0..(INLINE_TIES as u32 + 3) {
            c.observe(EdgeKey::new(s, s), 1, 1.0, 16);
        }
        assert_eq!(c.edges().len(), INLINE_TIES + 3);
        assert_eq!(c.weight(), (INLINE_TIES + 3) as f64);
    }
}
