use thiserror::Error;

/// Errors from opening a world file or decoding its contents.
///
/// None of these are recoverable at this layer: a failed `open` yields no `World`,
/// and a failed cursor operation leaves the cursor where it was.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported world version {version} (supported: {min}..={max})")]
    UnsupportedVersion { version: i32, min: i32, max: i32 },

    #[error("invalid world file: bad magic {found:?}")]
    BadMagic { found: [u8; 7] },

    #[error("not a world file (file type {found}, expected {expected})")]
    WrongFileType { found: u8, expected: u8 },

    #[error("invalid section table: {count} sections")]
    InvalidSectionTable { count: i16 },

    #[error("invalid tile extra table: {count} tile types")]
    InvalidExtraTable { count: i16 },

    #[error("invalid world dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("section {index} out of range ({count} sections)")]
    SectionOutOfRange { index: usize, count: usize },

    #[error("section {index} has invalid offset {offset}")]
    InvalidOffset { index: usize, offset: i32 },

    #[error("unknown tile type {tile_type} at offset {offset:#x} ({count} types known)")]
    UnknownTileType {
        tile_type: u16,
        offset: usize,
        count: usize,
    },

    #[error("corrupt run length in tile record at offset {offset:#x}: {detail}")]
    CorruptRunLength { offset: usize, detail: String },

    #[error("unexpected end of data at offset {offset:#x} (need {need} bytes, have {have})")]
    TruncatedInput {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("tile scan gave up after decoding {limit} records")]
    ScanLimitExceeded { limit: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
