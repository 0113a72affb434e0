use crate::error::EdgeRejection;

/// Dense handle for an interned node identifier.
pub type NodeId = u32;

/// Interned `(source, dest)` identity stored inside cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub source: NodeId,
    pub dest: NodeId,
}

impl EdgeKey {
    #[inline]
    pub fn new(source: NodeId, dest: NodeId) -> Self {
        Self { source, dest }
    }
}

/// One observation from the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: String,
    pub dest: String,
    pub weight: f64,
}

impl Edge {
    pub fn new(source: impl Into<String>, dest: impl Into<String>, weight: f64) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            weight,
        }
    }

    pub fn validate(&self) -> Result<(), EdgeRejection> {
        if self.source.is_empty() {
            return Err(EdgeRejection::EmptySource);
        }
        if self.dest.is_empty() {
            return Err(EdgeRejection::EmptyDest);
        }
        if !self.weight.is_finite() {
            return Err(EdgeRejection::NonFiniteWeight(self.weight));
        }
        if self.weight < 0.0 {
            return Err(EdgeRejection::NegativeWeight(self.weight));
        }
        Ok(())
    }
}

/// Result of one `update` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub applied: usize,
    pub rejected: usize,
}

/// Point-in-time aggregate over the grid and the connectivity table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SketchStats {
    pub hash_functions: usize,
    pub total_edges: usize,
    pub total_weight: f64,
    pub occupied_cells: usize,
    pub total_cells: usize,
    pub occupancy_rate: f64,
    pub observed_edges: u64,
    pub rejected_edges: u64,
    pub saturated_drops: u64,
    pub tracked_nodes: usize,
    pub components: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_reasons() {
        assert_eq!(Edge::new("a", "b", 0.0).validate(), Ok(()));
        assert_eq!(
            Edge::new("", "b", 1.0).validate(),
            Err(EdgeRejection::EmptySource)
        );
        assert_eq!(
            Edge::new("a", "", 1.0).validate(),
            Err(EdgeRejection::EmptyDest)
        );
        assert_eq!(
            Edge::new("a", "b", -0.5).validate(),
            Err(EdgeRejection::NegativeWeight(-0.5))
        );
        assert!(matches!(
            Edge::new("a", "b", f64::NAN).validate(),
            Err(EdgeRejection::NonFiniteWeight(_))
        ));
    }
}
