pub mod cell;
pub mod dsu;
pub mod engine;
pub mod grid;
pub mod hashing;
pub mod nodes;
pub mod types;

pub use engine::SketchEngine;
pub use hashing::{CoordinateScheme, Coords, MAX_RANK, SeededCoordinates};
pub use types::*;
