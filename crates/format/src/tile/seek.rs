use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::tile::record::TileRecord;
use crate::world::{TILE_SECTION, World};

/// A position in the tile grid: a logical tile index and the record that holds it.
///
/// Stateful and cheap to copy, but not meant to be shared: each thread walking a
/// world should own its cursor. Every operation is atomic; on error the cursor
/// keeps the position it had before the call.
#[derive(Debug, Clone)]
pub struct TileSeekCursor<'w> {
    world: &'w World,
    record: TileRecord,
    /// Absolute offset of the current record.
    file_offset: usize,
    /// Position inside the current record's run, `0..=record.run_length`.
    run_offset: u32,
    /// Logical tile index.
    index: u64,
    records_decoded: u64,
}

/// Snapshot of a cursor's position, comparable across cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePosition {
    pub index: u64,
    pub file_offset: usize,
    pub run_offset: u32,
    pub record: TileRecord,
}

impl<'w> TileSeekCursor<'w> {
    /// Position a cursor at logical tile `target`, scanning from the start of the
    /// tile section. Linear in the number of records before the target.
    pub fn locate(world: &'w World, target: u64) -> Result<Self> {
        Self::scan(world, target, None)
    }

    /// Like [`TileSeekCursor::locate`], but gives up once `max_records` records
    /// have been decoded without reaching the target.
    pub fn locate_with_limit(world: &'w World, target: u64, max_records: u64) -> Result<Self> {
        Self::scan(world, target, Some(max_records))
    }

    fn scan(world: &'w World, target: u64, limit: Option<u64>) -> Result<Self> {
        let mut c = world.section(TILE_SECTION)?;
        let mut index = 0u64;
        let mut decoded = 0u64;
        loop {
            if limit.is_some_and(|limit| decoded >= limit) {
                return Err(Error::ScanLimitExceeded { limit: decoded });
            }
            let file_offset = c.position();
            let record = TileRecord::decode(&mut c, world)?;
            decoded += 1;
            if index + record.run_length as u64 >= target {
                tracing::trace!(tile = target, file_offset, records = decoded, "located tile");
                return Ok(Self {
                    world,
                    record,
                    file_offset,
                    run_offset: (target - index) as u32,
                    index: target,
                    records_decoded: decoded,
                });
            }
            index += record.covers();
        }
    }

    /// Move to the next logical tile. Decodes only when leaving the current run.
    pub fn advance(&mut self) -> Result<()> {
        if self.run_offset < self.record.run_length {
            self.run_offset += 1;
            self.index += 1;
            return Ok(());
        }
        let next = self.file_offset + self.record.encoded_size as usize;
        let record = TileRecord::decode_at(self.world, next)?;
        self.record = record;
        self.file_offset = next;
        self.run_offset = 0;
        self.index += 1;
        self.records_decoded += 1;
        Ok(())
    }

    /// Move forward `n` tiles. Same result as `n` calls to [`TileSeekCursor::advance`],
    /// but whole runs are stepped over at once.
    pub fn skip(&mut self, n: u64) -> Result<()> {
        self.step(n, None)
    }

    /// Like [`TileSeekCursor::skip`], but fails with `ScanLimitExceeded` instead of
    /// decoding more than `max_records` records. The cursor does not move on failure.
    pub fn skip_with_limit(&mut self, n: u64, max_records: u64) -> Result<()> {
        self.step(n, Some(max_records))
    }

    fn step(&mut self, n: u64, limit: Option<u64>) -> Result<()> {
        let mut record = self.record;
        let mut file_offset = self.file_offset;
        let mut run_offset = self.run_offset as u64;
        let mut decoded = 0u64;
        let mut left = n;
        loop {
            let rest_of_run = record.run_length as u64 - run_offset;
            if left <= rest_of_run {
                run_offset += left;
                break;
            }
            if let Some(limit) = limit.filter(|&limit| decoded >= limit) {
                return Err(Error::ScanLimitExceeded { limit });
            }
            left -= rest_of_run + 1;
            file_offset += record.encoded_size as usize;
            record = TileRecord::decode_at(self.world, file_offset)?;
            decoded += 1;
            run_offset = 0;
        }
        self.record = record;
        self.file_offset = file_offset;
        self.run_offset = run_offset as u32;
        self.index += n;
        self.records_decoded += decoded;
        Ok(())
    }

    pub fn world(&self) -> &'w World {
        self.world
    }

    pub fn record(&self) -> TileRecord {
        self.record
    }

    pub fn file_offset(&self) -> usize {
        self.file_offset
    }

    pub fn run_offset(&self) -> u32 {
        self.run_offset
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// Records decoded since the cursor was created, including the locate scan.
    pub fn records_decoded(&self) -> u64 {
        self.records_decoded
    }

    pub fn position(&self) -> TilePosition {
        TilePosition {
            index: self.index,
            file_offset: self.file_offset,
            run_offset: self.run_offset,
            record: self.record,
        }
    }
}

/// Sequential walk over the records of the tile section.
///
/// Yields `(file_offset, record)` pairs. The section has no terminator, so the walk
/// only ends on an error, which is yielded once; callers stop when they have covered
/// the tiles they expect.
pub struct TileRecords<'w> {
    world: &'w World,
    cursor: Option<Cursor<'w>>,
}

impl<'w> TileRecords<'w> {
    pub fn new(world: &'w World) -> Result<Self> {
        let cursor = world.section(TILE_SECTION)?;
        Ok(Self {
            world,
            cursor: Some(cursor),
        })
    }
}

impl Iterator for TileRecords<'_> {
    type Item = Result<(usize, TileRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.cursor.as_mut()?;
        let offset = c.position();
        match TileRecord::decode(c, self.world) {
            Ok(record) => Some(Ok((offset, record))),
            Err(e) => {
                self.cursor = None;
                Some(Err(e))
            }
        }
    }
}
