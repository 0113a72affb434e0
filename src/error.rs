use thiserror::Error;

/// Errors returned by the sketch engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SketchError {
    /// A construction parameter is out of range.
    #[error("invalid configuration: {field} must be positive (got {value})")]
    InvalidConfig { field: &'static str, value: usize },

    /// `depth × width × width` cells cannot be addressed on this platform.
    #[error("invalid configuration: grid {depth}x{width}x{width} is too large to allocate")]
    GridTooLarge { depth: usize, width: usize },

    /// An environment override is set but is not a positive integer.
    #[error("invalid configuration: {key}={value:?} is not a positive integer")]
    InvalidEnv { key: &'static str, value: String },

    /// An edge was rejected during `update`; the rest of the batch is unaffected.
    #[error("invalid edge: {0}")]
    InvalidEdge(EdgeRejection),
}

/// Why a single edge was refused.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EdgeRejection {
    #[error("empty source identifier")]
    EmptySource,
    #[error("empty destination identifier")]
    EmptyDest,
    #[error("negative weight {0}")]
    NegativeWeight(f64),
    #[error("non-finite weight {0}")]
    NonFiniteWeight(f64),
    #[error("node table is full ({0} identifiers)")]
    NodeTableFull(usize),
}

impl From<EdgeRejection> for SketchError {
    fn from(r: EdgeRejection) -> Self {
        Self::InvalidEdge(r)
    }
}

pub type Result<T> = std::result::Result<T, SketchError>;
