use serde::Serialize;
use tileshot_format::{TileRecords, World};

use crate::error::CaptureError;

/// Totals from a full walk of the tile section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridReport {
    pub records: u64,
    pub tiles: u64,
    /// Encoded bytes of the tile records walked.
    pub bytes: u64,
}

/// Walk every tile record and check the runs cover `width * height` tiles exactly.
///
/// The walk stops as soon as the grid is covered; bytes past that point are not
/// inspected. A run that crosses the end of the grid is a [`CaptureError::GridMismatch`].
pub fn verify_grid(world: &World) -> Result<GridReport, CaptureError> {
    let size = world.world_size()?;
    let expected = size.tile_count();
    let _span = tracing::info_span!(
        "verify_grid",
        width = size.width,
        height = size.height
    )
    .entered();

    let mut report = GridReport {
        records: 0,
        tiles: 0,
        bytes: 0,
    };
    if expected == 0 {
        return Ok(report);
    }
    for item in TileRecords::new(world)? {
        let (_, record) = item?;
        report.records += 1;
        report.tiles += record.covers();
        report.bytes += record.encoded_size as u64;
        if report.tiles >= expected {
            break;
        }
    }
    if report.tiles != expected {
        return Err(CaptureError::GridMismatch {
            expected,
            found: report.tiles,
        });
    }
    tracing::debug!(records = report.records, bytes = report.bytes, "grid verified");
    Ok(report)
}
