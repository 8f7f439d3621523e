use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::world::{TILE_SECTION, World};

// flags1
pub const FLAG_HAS_FLAGS2: u8 = 0x01;
pub const FLAG_ACTIVE: u8 = 0x02;
pub const FLAG_WALL: u8 = 0x04;
pub const FLAG_LIQUID_WATER: u8 = 0x08;
pub const FLAG_LIQUID_LAVA: u8 = 0x10;
/// Either liquid bit set means one liquid-amount byte follows.
pub const FLAG_LIQUID_MASK: u8 = FLAG_LIQUID_WATER | FLAG_LIQUID_LAVA;
pub const FLAG_TYPE_WIDE: u8 = 0x20;

// flags2
pub const FLAG_HAS_FLAGS3: u8 = 0x01;

// flags3
pub const FLAGS3_TILE_COLOR: u8 = 0x08;
pub const FLAGS3_WALL_COLOR: u8 = 0x10;

/// Run-length encodings, selected by the top two bits of flags1.
pub const RLE_NONE: u8 = 0;
pub const RLE_BYTE: u8 = 1;
pub const RLE_WORD: u8 = 2;

/// Frame coordinates carried by tile types flagged in the extra table (two u16s).
const FRAME_BYTES: usize = 4;

/// Shape of one encoded tile record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileRecord {
    /// Bytes the record occupies on disk.
    pub encoded_size: u32,
    /// Additional tiles, after this one, that repeat its value.
    pub run_length: u32,
}

impl TileRecord {
    /// Number of logical tiles the record covers.
    pub fn covers(&self) -> u64 {
        self.run_length as u64 + 1
    }

    /// Decode the record at the cursor and advance past it.
    ///
    /// Only the fields that determine the record's length are interpreted; tile,
    /// wall, color and liquid values are skipped. On failure the cursor is unchanged.
    pub fn decode(cursor: &mut Cursor<'_>, world: &World) -> Result<Self> {
        let mut c = cursor.clone();
        let start = c.position();

        let flags1 = c.read_u8()?;
        let rle_format = flags1 >> 6;
        if rle_format > RLE_WORD {
            return Err(Error::CorruptRunLength {
                offset: start,
                detail: format!("undefined run-length format {rle_format:#04b}"),
            });
        }

        let flags2 = if flags1 & FLAG_HAS_FLAGS2 != 0 {
            c.read_u8()?
        } else {
            0
        };
        let flags3 = if flags2 & FLAG_HAS_FLAGS3 != 0 {
            c.read_u8()?
        } else {
            0
        };

        if flags1 & FLAG_ACTIVE != 0 {
            let type_at = c.position();
            let mut tile_type = c.read_u8()? as u16;
            if flags1 & FLAG_TYPE_WIDE != 0 {
                tile_type |= (c.read_u8()? as u16) << 8;
            }
            let has_frame = world.has_extra(tile_type).ok_or(Error::UnknownTileType {
                tile_type,
                offset: type_at,
                count: world.tile_type_count(),
            })?;
            if has_frame {
                c.skip(FRAME_BYTES)?;
            }
            if flags3 & FLAGS3_TILE_COLOR != 0 {
                c.skip(1)?;
            }
        }

        if flags1 & FLAG_WALL != 0 {
            c.skip(1)?;
            if flags3 & FLAGS3_WALL_COLOR != 0 {
                c.skip(1)?;
            }
        }

        if flags1 & FLAG_LIQUID_MASK != 0 {
            c.skip(1)?;
        }

        let run_length = match rle_format {
            RLE_NONE => 0,
            RLE_BYTE => c.read_u8()? as u32,
            _ => {
                let value = c.read_i16()?;
                if value < 0 {
                    return Err(Error::CorruptRunLength {
                        offset: start,
                        detail: format!("negative run length {value}"),
                    });
                }
                value as u32
            }
        };

        let record = Self {
            encoded_size: (c.position() - start) as u32,
            run_length,
        };
        *cursor = c;
        Ok(record)
    }

    /// Decode the record starting at absolute file offset `offset` of the tile section.
    pub fn decode_at(world: &World, offset: usize) -> Result<Self> {
        let mut c = Cursor::at(world.section_data(TILE_SECTION)?, offset);
        Self::decode(&mut c, world)
    }
}
