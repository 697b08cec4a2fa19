//! Public error taxonomy.
//!
//! Sub-component failures (cursor bounds checks, allocator validation,
//! B-tree traversal, value decoding) all collapse into this enum at the
//! component boundary, matching the mapping described in the container
//! format's error handling design.

use crate::fourcc::FourCc;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid magic number")]
    InvalidMagic,

    #[error("invalid container header: {0}")]
    InvalidHeader(String),

    #[error("allocator offset mismatch: header says {header}, check field says {check}")]
    OffsetMismatch { header: u32, check: u32 },

    #[error("invalid block address 0x{0:08x}")]
    InvalidBlockAddress(u32),

    #[error("invalid B-tree header: {0}")]
    InvalidBTreeHeader(String),

    #[error("unknown data type code {0}")]
    UnknownDataType(FourCc),

    #[error("invalid UTF-16BE string")]
    InvalidUtf16String,

    #[error("corrupted file: {0}")]
    Corrupted(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("property list error: {0}")]
    Plist(#[from] plist::Error),
}

impl Error {
    pub fn corrupted(reason: impl Into<String>) -> Self {
        Error::Corrupted(reason.into())
    }
}
