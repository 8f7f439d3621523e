use serde::{Deserialize, Serialize};

/// Dimensions of a world's tile grid, in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldSize {
    pub width: u32,
    pub height: u32,
}

impl WorldSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of logical tiles in the grid.
    pub fn tile_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Whether the coordinate lies inside the grid.
    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Flattened column-major index of a coordinate, matching on-disk record order.
    pub fn index_of(&self, coord: TileCoord) -> Option<u64> {
        if !self.contains(coord) {
            return None;
        }
        Some(coord.x as u64 * self.height as u64 + coord.y as u64)
    }

    /// Inverse of [`WorldSize::index_of`].
    pub fn coord_of(&self, index: u64) -> Option<TileCoord> {
        if index >= self.tile_count() {
            return None;
        }
        let height = self.height as u64;
        Some(TileCoord {
            x: (index / height) as u32,
            y: (index % height) as u32,
        })
    }
}

/// A tile position. `x` is the column, `y` the row (0 at the top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// A rectangle of tiles: `left..left + width` by `top..top + height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl TileRect {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// One past the rightmost column. Widened so it cannot overflow.
    pub fn right(&self) -> u64 {
        self.left as u64 + self.width as u64
    }

    /// One past the bottom row.
    pub fn bottom(&self) -> u64 {
        self.top as u64 + self.height as u64
    }

    /// Whether every tile of the rectangle lies inside `size`.
    pub fn fits_within(&self, size: WorldSize) -> bool {
        self.right() <= size.width as u64 && self.bottom() <= size.height as u64
    }
}
