//! Memory-bounded streaming graph sketch.
//!
//! A fixed `depth × width × width` grid keeps, per cell, only the edges tied
//! at the minimal rank seen there, which gives per-edge weight estimates in
//! bounded memory. An exact union-find next to it answers reachability.

pub mod config;
pub mod error;
pub mod runtime;
pub mod sketch;
pub mod stream;

pub use config::{DriverConfig, SketchConfig};
pub use error::{EdgeRejection, SketchError};
pub use sketch::{BatchOutcome, Edge, SketchEngine, SketchStats};
