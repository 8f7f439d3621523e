use serde::Serialize;
use tileshot_common::{TileCoord, TileRect};
use tileshot_format::{TileSeekCursor, World};

use crate::config::CaptureConfig;
use crate::error::CaptureError;

/// Where one sampled tile lives in the file.
///
/// Enough for a renderer to re-decode the record bytes at `record_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileRef {
    pub coord: TileCoord,
    pub index: u64,
    pub record_offset: usize,
    pub encoded_size: u32,
    pub run_length: u32,
    pub run_offset: u32,
}

impl TileRef {
    fn at(coord: TileCoord, cursor: &TileSeekCursor<'_>) -> Self {
        let record = cursor.record();
        Self {
            coord,
            index: cursor.index(),
            record_offset: cursor.file_offset(),
            encoded_size: record.encoded_size,
            run_length: record.run_length,
            run_offset: cursor.run_offset(),
        }
    }
}

/// Sampled tiles of a capture region, stored column-major.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureGrid {
    pub region: TileRect,
    /// Tiles per sampled cell along each axis.
    pub scale: u32,
    pub columns: u32,
    pub rows: u32,
    /// Records decoded to produce the grid, including the initial scan.
    pub records_decoded: u64,
    pub cells: Vec<TileRef>,
}

impl CaptureGrid {
    pub fn get(&self, column: u32, row: u32) -> Option<&TileRef> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells.get(column as usize * self.rows as usize + row as usize)
    }

    /// Number of distinct records the samples fall in.
    pub fn distinct_records(&self) -> usize {
        let mut offsets: Vec<usize> = self.cells.iter().map(|c| c.record_offset).collect();
        offsets.dedup();
        offsets.len()
    }
}

/// Sample `region` of `world`, one tile per `scale x scale` block (its top-left tile).
///
/// The first sample is found with one scan from the start of the tile section;
/// every later sample is reached by skipping forward from the previous one, in
/// column-major order. With `max_records` set, no record beyond the budget is
/// ever decoded.
pub fn capture(
    world: &World,
    region: TileRect,
    config: &CaptureConfig,
) -> Result<CaptureGrid, CaptureError> {
    let scale = config.scale()?;
    if region.is_empty() {
        return Err(CaptureError::EmptyRegion);
    }
    let size = world.world_size()?;
    if !region.fits_within(size) {
        return Err(CaptureError::RegionOutOfBounds { region, size });
    }

    let _span = tracing::info_span!("capture", ?region, zoom = config.zoom).entered();
    let columns = region.width.div_ceil(scale);
    let rows = region.height.div_ceil(scale);
    let mut cells = Vec::with_capacity(columns as usize * rows as usize);
    let mut cursor: Option<TileSeekCursor<'_>> = None;

    for column in 0..columns {
        let x = region.left + column * scale;
        for row in 0..rows {
            let coord = TileCoord::new(x, region.top + row * scale);
            let index = size
                .index_of(coord)
                .ok_or(CaptureError::RegionOutOfBounds { region, size })?;
            let current = match cursor.as_mut() {
                Some(current) => {
                    next_sample(current, index, config)?;
                    current
                }
                None => cursor.insert(first_sample(world, index, config)?),
            };
            cells.push(TileRef::at(coord, current));
        }
    }

    let records_decoded = cursor.map_or(0, |c| c.records_decoded());
    tracing::debug!(columns, rows, records = records_decoded, "capture complete");
    Ok(CaptureGrid {
        region,
        scale,
        columns,
        rows,
        records_decoded,
        cells,
    })
}

fn first_sample<'w>(
    world: &'w World,
    index: u64,
    config: &CaptureConfig,
) -> Result<TileSeekCursor<'w>, CaptureError> {
    let Some(limit) = config.max_records else {
        return Ok(TileSeekCursor::locate(world, index)?);
    };
    TileSeekCursor::locate_with_limit(world, index, limit).map_err(|e| over_budget(e, limit))
}

fn next_sample(
    cursor: &mut TileSeekCursor<'_>,
    index: u64,
    config: &CaptureConfig,
) -> Result<(), CaptureError> {
    let distance = index - cursor.index();
    let Some(limit) = config.max_records else {
        return Ok(cursor.skip(distance)?);
    };
    let left = limit.saturating_sub(cursor.records_decoded());
    cursor
        .skip_with_limit(distance, left)
        .map_err(|e| over_budget(e, limit))
}

fn over_budget(e: tileshot_format::Error, limit: u64) -> CaptureError {
    match e {
        tileshot_format::Error::ScanLimitExceeded { .. } => CaptureError::BudgetExceeded { limit },
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tileshot_format::fixture::{RecordSpec, WorldFixture};

    /// 4x4 world: column 0 is one run, column 1 four single tiles,
    /// columns 2-3 a single run spanning both.
    fn world() -> World {
        let fixture = WorldFixture::new(4, 4)
            .tile_extra(vec![false; 4])
            .records([
                RecordSpec::empty(3),
                RecordSpec::tile(0, 0),
                RecordSpec::tile(1, 0),
                RecordSpec::tile(2, 0),
                RecordSpec::tile(3, 0),
                RecordSpec::empty(7),
            ]);
        World::from_bytes(fixture.build()).unwrap()
    }

    fn assert_matches_locate(world: &World, grid: &CaptureGrid) {
        for cell in &grid.cells {
            let direct = TileSeekCursor::locate(world, cell.index).unwrap();
            assert_eq!(cell.record_offset, direct.file_offset(), "{:?}", cell.coord);
            assert_eq!(cell.run_offset, direct.run_offset(), "{:?}", cell.coord);
        }
    }

    #[test]
    fn full_resolution_capture() {
        let world = world();
        let region = TileRect::new(0, 1, 3, 2);
        let grid = capture(&world, region, &CaptureConfig::default()).unwrap();
        assert_eq!((grid.columns, grid.rows, grid.scale), (3, 2, 1));
        assert_eq!(grid.cells.len(), 6);
        assert_eq!(grid.get(1, 0).unwrap().coord, TileCoord::new(1, 1));
        assert_eq!(grid.get(2, 1).unwrap().index, 2 * 4 + 2);
        assert!(grid.get(3, 0).is_none());
        assert_matches_locate(&world, &grid);
        // Column 0 shares one record; column 1 has one per tile; column 2 one.
        assert_eq!(grid.distinct_records(), 1 + 2 + 1);
    }

    #[test]
    fn zoomed_capture_samples_block_corners() {
        let world = world();
        let config = CaptureConfig {
            zoom: 2,
            ..CaptureConfig::default()
        };
        let grid = capture(&world, TileRect::new(0, 0, 4, 4), &config).unwrap();
        let coords: Vec<TileCoord> = grid.cells.iter().map(|c| c.coord).collect();
        assert_eq!(
            coords,
            vec![
                TileCoord::new(0, 0),
                TileCoord::new(0, 2),
                TileCoord::new(2, 0),
                TileCoord::new(2, 2),
            ]
        );
        assert_matches_locate(&world, &grid);
    }

    #[test]
    fn partial_blocks_round_up() {
        let world = world();
        let config = CaptureConfig {
            zoom: 2,
            ..CaptureConfig::default()
        };
        let grid = capture(&world, TileRect::new(1, 1, 3, 1), &config).unwrap();
        assert_eq!((grid.columns, grid.rows), (2, 1));
        assert_eq!(grid.get(1, 0).unwrap().coord, TileCoord::new(3, 1));
    }

    #[test]
    fn region_checks() {
        let world = world();
        let config = CaptureConfig::default();
        assert!(matches!(
            capture(&world, TileRect::new(0, 0, 0, 4), &config),
            Err(CaptureError::EmptyRegion)
        ));
        assert!(matches!(
            capture(&world, TileRect::new(2, 0, 3, 1), &config),
            Err(CaptureError::RegionOutOfBounds { .. })
        ));
        let bad_zoom = CaptureConfig {
            zoom: 9,
            ..CaptureConfig::default()
        };
        assert!(matches!(
            capture(&world, TileRect::new(0, 0, 1, 1), &bad_zoom),
            Err(CaptureError::InvalidZoom(9))
        ));
    }

    #[test]
    fn record_budget() {
        let world = world();
        let region = TileRect::new(0, 0, 4, 4);
        let tight = CaptureConfig {
            max_records: Some(3),
            ..CaptureConfig::default()
        };
        assert!(matches!(
            capture(&world, region, &tight),
            Err(CaptureError::BudgetExceeded { limit: 3 })
        ));
        // Locating the first tile of column 3 alone takes six records.
        let late = TileRect::new(3, 0, 1, 1);
        let scan = CaptureConfig {
            max_records: Some(5),
            ..CaptureConfig::default()
        };
        assert!(matches!(
            capture(&world, late, &scan),
            Err(CaptureError::BudgetExceeded { limit: 5 })
        ));
        let enough = CaptureConfig {
            max_records: Some(6),
            ..CaptureConfig::default()
        };
        let grid = capture(&world, region, &enough).unwrap();
        assert_eq!(grid.records_decoded, 6);
    }

    #[test]
    fn budget_holds_across_long_skips() {
        let fixture = WorldFixture::new(1, 40).records((0..40).map(|_| RecordSpec::empty(0)));
        let world = World::from_bytes(fixture.build()).unwrap();
        let region = TileRect::new(0, 0, 1, 40);
        let config = |max_records| CaptureConfig {
            zoom: 5,
            max_records: Some(max_records),
        };
        // Samples rows 0, 16 and 32: one record, then sixteen per skip.
        assert!(matches!(
            capture(&world, region, &config(32)),
            Err(CaptureError::BudgetExceeded { limit: 32 })
        ));
        let grid = capture(&world, region, &config(33)).unwrap();
        assert_eq!(grid.records_decoded, 33);
        assert_eq!(grid.rows, 3);
    }

    #[test]
    fn grid_serializes_to_json() {
        let world = world();
        let grid = capture(&world, TileRect::new(1, 2, 1, 1), &CaptureConfig::default()).unwrap();
        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json["columns"], 1);
        assert_eq!(json["cells"][0]["coord"]["x"], 1);
        assert_eq!(json["cells"][0]["coord"]["y"], 2);
        assert_eq!(json["cells"][0]["index"], 6);
    }
}
