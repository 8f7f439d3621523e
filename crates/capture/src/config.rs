use crate::error::CaptureError;

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 5;

/// Capture configuration: sampling density plus an optional work budget.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Zoom level in `MIN_ZOOM..=MAX_ZOOM`. Each sampled cell stands for a
    /// `2^(zoom-1)` square of tiles.
    pub zoom: u8,
    /// Maximum number of tile records to decode, locate scan included.
    pub max_records: Option<u64>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            zoom: MIN_ZOOM,
            max_records: None,
        }
    }
}

impl CaptureConfig {
    /// Tiles per sampled cell along each axis.
    pub fn scale(&self) -> Result<u32, CaptureError> {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&self.zoom) {
            return Err(CaptureError::InvalidZoom(self.zoom));
        }
        Ok(1 << (self.zoom - 1))
    }
}
