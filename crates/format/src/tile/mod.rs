//! Tile records and the seekable tile cursor.
//!
//! The tile section is a flat sequence of variable-length records in column-major
//! order. Each record describes one tile and may declare that the next `run_length`
//! tiles are identical, so record boundaries cannot be found without decoding every
//! record before them.

mod record;
mod seek;

pub use record::{
    FLAG_ACTIVE, FLAG_HAS_FLAGS2, FLAG_HAS_FLAGS3, FLAG_LIQUID_LAVA, FLAG_LIQUID_MASK,
    FLAG_LIQUID_WATER, FLAG_TYPE_WIDE, FLAG_WALL, FLAGS3_TILE_COLOR, FLAGS3_WALL_COLOR, RLE_BYTE,
    RLE_NONE, RLE_WORD, TileRecord,
};
pub use seek::{TilePosition, TileRecords, TileSeekCursor};
