//! Capture: sample a rectangle of an opened world at a zoom level, and verify
//! that a world's tile section covers its grid.
//!
//! # Invariants
//! - A capture never reads outside the requested rectangle's columns, except to
//!   step over the tiles between the bottom of one column and the top of the next.
//! - Only one linear scan from the section start is made per capture; every later
//!   sample is reached by skipping forward.

mod capture;
mod config;
mod error;
mod verify;

pub use capture::{CaptureGrid, TileRef, capture};
pub use config::{CaptureConfig, MAX_ZOOM, MIN_ZOOM};
pub use error::CaptureError;
pub use verify::{GridReport, verify_grid};
