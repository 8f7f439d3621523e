//! Synthetic world files for tests and benchmarks.
//!
//! Builds the smallest byte layout the reader accepts: header, section table,
//! tile-extra table, an info section and a tile section. Sections past the tile
//! section (see [`WorldFixture::extra_sections`]) all start where the tile section
//! ends, followed by any trailer bytes.

use crate::tile::{
    FLAG_ACTIVE, FLAG_HAS_FLAGS2, FLAG_HAS_FLAGS3, FLAG_LIQUID_WATER, FLAG_TYPE_WIDE,
    FLAG_WALL, FLAGS3_TILE_COLOR, FLAGS3_WALL_COLOR, RLE_BYTE, RLE_WORD,
};
use crate::world::{SIGNATURE, WORLD_FILE_TYPE};

/// A world file under construction.
#[derive(Debug, Clone)]
pub struct WorldFixture {
    pub version: i32,
    pub magic: [u8; 7],
    pub file_type: u8,
    pub title: Vec<u8>,
    pub width: i32,
    pub height: i32,
    pub tile_extra: Vec<bool>,
    /// Sections appended after the tile section.
    pub extra_sections: usize,
    /// Raw tile section bytes.
    pub tiles: Vec<u8>,
    /// Bytes written after the tile section, inside the extra sections.
    pub trailer: Vec<u8>,
}

impl WorldFixture {
    /// Version 156 world of the given size with one tile type and no tiles.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            version: 156,
            magic: SIGNATURE,
            file_type: WORLD_FILE_TYPE,
            title: b"fixture".to_vec(),
            width,
            height,
            tile_extra: vec![false],
            extra_sections: 0,
            tiles: Vec::new(),
            trailer: Vec::new(),
        }
    }

    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.as_bytes().to_vec();
        self
    }

    pub fn tile_extra(mut self, flags: Vec<bool>) -> Self {
        self.tile_extra = flags;
        self
    }

    pub fn extra_sections(mut self, count: usize) -> Self {
        self.extra_sections = count;
        self
    }

    /// Content of the sections after the tile section.
    pub fn trailer(mut self, bytes: &[u8]) -> Self {
        self.trailer = bytes.to_vec();
        self
    }

    pub fn record(mut self, record: RecordSpec) -> Self {
        self.tiles.extend(record.encode());
        self
    }

    pub fn records(mut self, records: impl IntoIterator<Item = RecordSpec>) -> Self {
        for record in records {
            self.tiles.extend(record.encode());
        }
        self
    }

    /// Offset at which the tile section will start in the built file.
    pub fn tile_section_offset(&self) -> usize {
        let signature = if self.version >= 135 { 8 } else { 0 };
        let sections = 2 + self.extra_sections;
        4 + signature
            + 12
            + 2
            + 4 * sections
            + 2
            + self.tile_extra.len().div_ceil(8)
            + 1
            + self.title.len()
            + 20
            + 8
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        if self.version >= 135 {
            out.extend_from_slice(&self.magic);
            out.push(self.file_type);
        }
        out.extend_from_slice(&[0u8; 12]);

        let section_count = 2 + self.extra_sections;
        out.extend_from_slice(&(section_count as i16).to_le_bytes());
        let table_at = out.len();
        out.resize(out.len() + 4 * section_count, 0);

        out.extend_from_slice(&(self.tile_extra.len() as i16).to_le_bytes());
        out.extend(pack_flags(&self.tile_extra));

        let info_at = out.len();
        out.push(self.title.len() as u8);
        out.extend_from_slice(&self.title);
        out.extend_from_slice(&[0u8; 20]);
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());

        let tiles_at = out.len();
        out.extend_from_slice(&self.tiles);
        let tiles_end = out.len();
        out.extend_from_slice(&self.trailer);

        let mut offsets = vec![info_at, tiles_at];
        offsets.resize(section_count, tiles_end);
        for (i, offset) in offsets.into_iter().enumerate() {
            let at = table_at + 4 * i;
            out[at..at + 4].copy_from_slice(&(offset as i32).to_le_bytes());
        }
        out
    }
}

/// Pack flags eight per byte, most significant bit first.
pub fn pack_flags(flags: &[bool]) -> Vec<u8> {
    let mut packed = vec![0u8; flags.len().div_ceil(8)];
    for (i, &flag) in flags.iter().enumerate() {
        if flag {
            packed[i / 8] |= 0x80 >> (i % 8);
        }
    }
    packed
}

/// One tile record to encode. Unset fields are absent from the encoding.
#[derive(Debug, Clone, Default)]
pub struct RecordSpec {
    pub tile_type: Option<u16>,
    /// Write four frame bytes after the type. Must agree with the world's extra table.
    pub frame: bool,
    pub tile_color: Option<u8>,
    pub wall: Option<u8>,
    pub wall_color: Option<u8>,
    pub liquid: Option<u8>,
    pub run_length: u32,
}

impl RecordSpec {
    /// An empty cell repeated `run_length` more times.
    pub fn empty(run_length: u32) -> Self {
        Self {
            run_length,
            ..Self::default()
        }
    }

    /// An active tile of `tile_type` repeated `run_length` more times.
    pub fn tile(tile_type: u16, run_length: u32) -> Self {
        Self {
            tile_type: Some(tile_type),
            run_length,
            ..Self::default()
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut flags1 = 0u8;
        let mut flags3 = 0u8;
        if let Some(tile_type) = self.tile_type {
            flags1 |= FLAG_ACTIVE;
            if tile_type > 0xff {
                flags1 |= FLAG_TYPE_WIDE;
            }
            if self.tile_color.is_some() {
                flags3 |= FLAGS3_TILE_COLOR;
            }
        }
        if self.wall.is_some() {
            flags1 |= FLAG_WALL;
            if self.wall_color.is_some() {
                flags3 |= FLAGS3_WALL_COLOR;
            }
        }
        if self.liquid.is_some() {
            flags1 |= FLAG_LIQUID_WATER;
        }
        let flags2 = if flags3 != 0 { FLAG_HAS_FLAGS3 } else { 0 };
        if flags2 != 0 {
            flags1 |= FLAG_HAS_FLAGS2;
        }
        match self.run_length {
            0 => {}
            1..=0xff => flags1 |= RLE_BYTE << 6,
            0x100..=0x7fff => flags1 |= RLE_WORD << 6,
            n => panic!("run length {n} does not fit a 16-bit record"),
        }

        let mut out = vec![flags1];
        if flags2 != 0 {
            out.push(flags2);
            out.push(flags3);
        }
        if let Some(tile_type) = self.tile_type {
            out.push(tile_type as u8);
            if tile_type > 0xff {
                out.push((tile_type >> 8) as u8);
            }
            if self.frame {
                out.extend_from_slice(&[0x12, 0x00, 0x24, 0x00]);
            }
            if let Some(color) = self.tile_color {
                out.push(color);
            }
        }
        if let Some(wall) = self.wall {
            out.push(wall);
            if let Some(color) = self.wall_color {
                out.push(color);
            }
        }
        if let Some(amount) = self.liquid {
            out.push(amount);
        }
        match self.run_length {
            0 => {}
            n @ 1..=0xff => out.push(n as u8),
            n => out.extend_from_slice(&(n as i16).to_le_bytes()),
        }
        out
    }
}
