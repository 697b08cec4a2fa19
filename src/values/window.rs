//! Window bounds and view style (`fwi0`).

use crate::error::{Error, Result};
use crate::fourcc::{known, FourCc};
use crate::record::Record;
use crate::value::RecordValue;

/// A window's screen rectangle and the view style it should open in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub top: u16,
    pub left: u16,
    pub bottom: u16,
    pub right: u16,
    pub view_style: FourCc,
}

impl WindowBounds {
    pub fn to_record(self, filename: impl Into<String>) -> Result<Record> {
        let mut bytes = Vec::with_capacity(16);
        bytes.extend_from_slice(&self.top.to_be_bytes());
        bytes.extend_from_slice(&self.left.to_be_bytes());
        bytes.extend_from_slice(&self.bottom.to_be_bytes());
        bytes.extend_from_slice(&self.right.to_be_bytes());
        bytes.extend_from_slice(&self.view_style.to_bytes());
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        Record::new(filename, known::FWI0, RecordValue::Blob(bytes))
    }

    pub fn from_record(record: &Record) -> Result<Self> {
        if record.type_code != known::FWI0 {
            return Err(Error::corrupted(format!(
                "record type {} is not fwi0",
                record.type_code
            )));
        }
        let bytes = match &record.value {
            RecordValue::Blob(bytes) => bytes,
            other => return Err(Error::corrupted(format!("fwi0 value is not a blob: {other:?}"))),
        };
        if bytes.len() != 16 {
            return Err(Error::corrupted(format!(
                "fwi0 payload is {} bytes, expected 16",
                bytes.len()
            )));
        }
        Ok(WindowBounds {
            top: u16::from_be_bytes(bytes[0..2].try_into().unwrap()),
            left: u16::from_be_bytes(bytes[2..4].try_into().unwrap()),
            bottom: u16::from_be_bytes(bytes[4..6].try_into().unwrap()),
            right: u16::from_be_bytes(bytes[6..8].try_into().unwrap()),
            view_style: FourCc(u32::from_be_bytes(bytes[8..12].try_into().unwrap())),
        })
    }
}
