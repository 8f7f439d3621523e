use tileshot_common::{TileRect, WorldSize};

/// Errors from capturing or verifying a world.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("world format error: {0}")]
    Format(#[from] tileshot_format::Error),
    #[error("invalid zoom level {0} (expected 1..=5)")]
    InvalidZoom(u8),
    #[error("capture region is empty")]
    EmptyRegion,
    #[error("capture region {region:?} extends outside the {}x{} world", size.width, size.height)]
    RegionOutOfBounds { region: TileRect, size: WorldSize },
    #[error("record budget of {limit} exhausted")]
    BudgetExceeded { limit: u64 },
    #[error("tile records cover {found} tiles, expected {expected}")]
    GridMismatch { expected: u64, found: u64 },
}
