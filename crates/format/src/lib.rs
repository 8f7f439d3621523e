//! Reader for versioned, run-length-encoded tile-grid world files.
//!
//! Layers, leaf first:
//! - `source`: the read-only mapped bytes, the only part that touches the OS
//! - `cursor`: bounds-checked little-endian primitive reads
//! - `world`: header, section table and tile-extra table, parsed once at open
//! - `tile`: per-record decoder and the seekable tile cursor
//!
//! # Invariants
//! - Every read is length-checked; truncated input is an error, never a default value.
//! - A `World` is immutable after open. Cursors borrow it and carry only their own position.

pub mod cursor;
pub mod error;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;
pub mod source;
pub mod tile;
pub mod version;
pub mod world;

pub use cursor::Cursor;
pub use error::{Error, Result};
pub use source::ByteSource;
pub use tile::{TilePosition, TileRecord, TileRecords, TileSeekCursor};
pub use version::FormatVersion;
pub use world::{SectionTable, World, WorldInfo};
