use std::path::Path;

use tileshot_common::WorldSize;

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::source::ByteSource;
use crate::version::FormatVersion;

/// Signature that follows the version field from version 135 on.
pub const SIGNATURE: [u8; 7] = *b"relogic";
/// File-type tag identifying a world file (as opposed to a map or player file).
pub const WORLD_FILE_TYPE: u8 = 2;
/// Reserved bytes between the signature block (or the version) and the section table.
const HEADER_GAP: usize = 12;
/// Fields between the title and the dimensions in the info section that nothing here needs.
const INFO_GAP: usize = 20;

/// Section holding the world info (title, dimensions, ...).
pub const INFO_SECTION: usize = 0;
/// Section holding the run-length encoded tile records.
pub const TILE_SECTION: usize = 1;

/// An opened world file.
///
/// Owns the file bytes. The section table is kept as a view into those bytes;
/// only the tile-extra table is unpacked, once, at open time. Nothing here is
/// mutable after open, so a `World` can be shared across threads while each thread
/// drives its own cursors.
pub struct World {
    source: ByteSource,
    version: FormatVersion,
    /// Offset of the first section table entry.
    sections_at: usize,
    section_count: usize,
    /// Whether tiles of each type carry frame coordinates, indexed by tile type.
    tile_extra: Vec<bool>,
}

/// Zero-copy view over the section offset table.
#[derive(Debug, Clone, Copy)]
pub struct SectionTable<'a> {
    raw: &'a [u8],
}

/// Title and dimensions from the info section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldInfo {
    pub title: String,
    pub size: WorldSize,
}

struct Header {
    version: FormatVersion,
    sections_at: usize,
    section_count: usize,
    tile_extra: Vec<bool>,
}

impl World {
    /// Map a world file and parse its header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let source = ByteSource::open(path)?;
        Self::from_source(source)
    }

    /// Parse a world held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_source(ByteSource::from_bytes(bytes))
    }

    /// Parse the header of `source`. On failure the source is dropped with the error.
    pub fn from_source(source: ByteSource) -> Result<Self> {
        let header = parse_header(&source)?;
        tracing::debug!(
            version = %header.version,
            sections = header.section_count,
            tile_types = header.tile_extra.len(),
            bytes = source.len(),
            "opened world"
        );
        Ok(Self {
            source,
            version: header.version,
            sections_at: header.sections_at,
            section_count: header.section_count,
            tile_extra: header.tile_extra,
        })
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// The whole file.
    pub fn bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn sections(&self) -> SectionTable<'_> {
        let end = self.sections_at + 4 * self.section_count;
        SectionTable {
            raw: &self.bytes()[self.sections_at..end],
        }
    }

    /// Number of tile types in the extra-data table.
    pub fn tile_type_count(&self) -> usize {
        self.tile_extra.len()
    }

    /// Whether tiles of `tile_type` carry frame coordinates. `None` for unknown types.
    pub fn has_extra(&self, tile_type: u16) -> Option<bool> {
        self.tile_extra.get(tile_type as usize).copied()
    }

    /// Cursor positioned at the start of section `index`.
    ///
    /// Reads past the end of the section fail `TruncatedInput`, even when more of
    /// the file follows.
    pub fn section(&self, index: usize) -> Result<Cursor<'_>> {
        let (start, end) = self.section_bounds(index)?;
        Ok(Cursor::at(&self.bytes()[..end], start))
    }

    /// File bytes up to the end of section `index`. Offsets into it are file offsets.
    pub fn section_data(&self, index: usize) -> Result<&[u8]> {
        let (_, end) = self.section_bounds(index)?;
        Ok(&self.bytes()[..end])
    }

    /// Start and end offsets of section `index`.
    ///
    /// A section ends where the next one starts. The last section, or one whose
    /// successor offset is negative or lies before it, runs to end of file.
    fn section_bounds(&self, index: usize) -> Result<(usize, usize)> {
        let table = self.sections();
        let offset = table.get(index).ok_or(Error::SectionOutOfRange {
            index,
            count: table.len(),
        })?;
        if offset < 0 {
            return Err(Error::InvalidOffset { index, offset });
        }
        let start = offset as usize;
        let end = table
            .get(index + 1)
            .and_then(|next| usize::try_from(next).ok())
            .filter(|&next| next >= start)
            .map_or(self.len(), |next| next.min(self.len()));
        Ok((start, end))
    }

    /// Width and height of the tile grid.
    pub fn world_size(&self) -> Result<WorldSize> {
        let (_, size) = self.read_info()?;
        Ok(size)
    }

    /// Title and dimensions.
    pub fn info(&self) -> Result<WorldInfo> {
        let (title, size) = self.read_info()?;
        Ok(WorldInfo {
            title: String::from_utf8_lossy(title).into_owned(),
            size,
        })
    }

    fn read_info(&self) -> Result<(&[u8], WorldSize)> {
        let mut c = self.section(INFO_SECTION)?;
        let title = c.read_string()?;
        c.skip(INFO_GAP)?;
        let height = c.read_i32()?;
        let width = c.read_i32()?;
        if width < 0 || height < 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok((title, WorldSize::new(width as u32, height as u32)))
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("version", &self.version)
            .field("size", &self.source.len())
            .field("sections", &self.section_count)
            .field("tile_types", &self.tile_extra.len())
            .finish()
    }
}

impl<'a> SectionTable<'a> {
    pub fn len(&self) -> usize {
        self.raw.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Stored file offset of section `index`.
    pub fn get(&self, index: usize) -> Option<i32> {
        let start = index.checked_mul(4)?;
        let bytes = self.raw.get(start..start + 4)?;
        Some(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + 'a {
        self.raw
            .chunks_exact(4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

fn parse_header(data: &[u8]) -> Result<Header> {
    let mut c = Cursor::new(data);

    let version = FormatVersion(c.read_i32()?);
    if !version.is_supported() {
        return Err(Error::UnsupportedVersion {
            version: version.0,
            min: FormatVersion::MIN_SUPPORTED.0,
            max: FormatVersion::MAX_SUPPORTED.0,
        });
    }

    if version.has_signature() {
        let magic = c.read_bytes(SIGNATURE.len())?;
        if magic != SIGNATURE {
            let mut found = [0u8; 7];
            found.copy_from_slice(magic);
            return Err(Error::BadMagic { found });
        }
        let file_type = c.read_u8()?;
        if file_type != WORLD_FILE_TYPE {
            return Err(Error::WrongFileType {
                found: file_type,
                expected: WORLD_FILE_TYPE,
            });
        }
    }
    c.skip(HEADER_GAP)?;

    let count = c.read_i16()?;
    if count <= 0 {
        return Err(Error::InvalidSectionTable { count });
    }
    let section_count = count as usize;
    let sections_at = c.position();
    c.skip(4 * section_count)?;

    let count = c.read_i16()?;
    if count <= 0 {
        return Err(Error::InvalidExtraTable { count });
    }
    let type_count = count as usize;
    let packed = c.read_bytes(type_count.div_ceil(8))?;
    let tile_extra = unpack_flags(packed, type_count);

    Ok(Header {
        version,
        sections_at,
        section_count,
        tile_extra,
    })
}

/// Unpack `count` flags, eight per byte, most significant bit first.
fn unpack_flags(packed: &[u8], count: usize) -> Vec<bool> {
    (0..count)
        .map(|i| packed[i / 8] & (0x80 >> (i % 8)) != 0)
        .collect()
}
