//! Shared types: world dimensions, tile coordinates, capture rectangles.
//!
//! # Invariants
//! - Logical tile indices are column-major: `index = x * height + y`.
//! - A `TileRect` never describes tiles outside the `WorldSize` it was checked against.

pub mod types;

pub use types::{TileCoord, TileRect, WorldSize};
