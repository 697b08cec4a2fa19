//! Icon position (`Iloc`).

use crate::error::{Error, Result};
use crate::fourcc::known;
use crate::record::Record;
use crate::value::RecordValue;

/// Six `0xFF` bytes then two `0x00` bytes, observed constant across every
/// sample file; written as-is, ignored on read beyond a length check.
const TRAILER: [u8; 8] = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00];

/// Where an icon sits within its containing window, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconPosition {
    pub x: u32,
    pub y: u32,
}

impl IconPosition {
    pub fn new(x: u32, y: u32) -> Self {
        IconPosition { x, y }
    }

    pub fn to_record(self, filename: impl Into<String>) -> Result<Record> {
        let mut bytes = Vec::with_capacity(16);
        bytes.extend_from_slice(&self.x.to_be_bytes());
        bytes.extend_from_slice(&self.y.to_be_bytes());
        bytes.extend_from_slice(&TRAILER);
        Record::new(filename, known::ILOC, RecordValue::Blob(bytes))
    }

    pub fn from_record(record: &Record) -> Result<Self> {
        if record.type_code != known::ILOC {
            return Err(Error::corrupted(format!(
                "record type {} is not Iloc",
                record.type_code
            )));
        }
        let bytes = match &record.value {
            RecordValue::Blob(bytes) => bytes,
            other => return Err(Error::corrupted(format!("Iloc value is not a blob: {other:?}"))),
        };
        if bytes.len() != 16 {
            return Err(Error::corrupted(format!(
                "Iloc payload is {} bytes, expected 16",
                bytes.len()
            )));
        }
        Ok(IconPosition {
            x: u32::from_be_bytes(bytes[0..4].try_into().unwrap()),
            y: u32::from_be_bytes(bytes[4..8].try_into().unwrap()),
        })
    }
}
