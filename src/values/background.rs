//! Folder background (`BKGD`).

use crate::error::{Error, Result};
use crate::fourcc::known;
use crate::record::Record;
use crate::value::RecordValue;

/// A folder's background: the host application's default, a flat color, or
/// a picture (whose bytes live in a separate `pict` record this type does
/// not model).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Default,
    Color { r: u16, g: u16, b: u16 },
    Picture { alias_len: u32 },
}

impl Background {
    fn to_bytes(self) -> Vec<u8> {
        match self {
            Background::Default => b"DefB".to_vec(),
            Background::Color { r, g, b } => {
                let mut out = b"ClrB".to_vec();
                out.extend_from_slice(&r.to_be_bytes());
                out.extend_from_slice(&g.to_be_bytes());
                out.extend_from_slice(&b.to_be_bytes());
                out.extend_from_slice(&[0, 0]);
                out
            }
            Background::Picture { alias_len } => {
                let mut out = b"PctB".to_vec();
                out.extend_from_slice(&alias_len.to_be_bytes());
                out.extend_from_slice(&[0, 0, 0, 0]);
                out
            }
        }
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(Error::corrupted("BKGD payload shorter than its 4-byte tag"));
        }
        match &bytes[0..4] {
            b"DefB" => Ok(Background::Default),
            b"ClrB" => {
                if bytes.len() < 10 {
                    return Err(Error::corrupted("ClrB payload too short"));
                }
                Ok(Background::Color {
                    r: u16::from_be_bytes(bytes[4..6].try_into().unwrap()),
                    g: u16::from_be_bytes(bytes[6..8].try_into().unwrap()),
                    b: u16::from_be_bytes(bytes[8..10].try_into().unwrap()),
                })
            }
            b"PctB" => {
                if bytes.len() < 8 {
                    return Err(Error::corrupted("PctB payload too short"));
                }
                Ok(Background::Picture {
                    alias_len: u32::from_be_bytes(bytes[4..8].try_into().unwrap()),
                })
            }
            other => Err(Error::corrupted(format!("unknown BKGD tag {other:?}"))),
        }
    }

    pub fn to_record(self, filename: impl Into<String>) -> Result<Record> {
        Record::new(filename, known::BKGD, RecordValue::Blob(self.to_bytes()))
    }

    pub fn from_record(record: &Record) -> Result<Self> {
        if record.type_code != known::BKGD {
            return Err(Error::corrupted(format!(
                "record type {} is not BKGD",
                record.type_code
            )));
        }
        match &record.value {
            RecordValue::Blob(bytes) => Background::from_bytes(bytes),
            other => Err(Error::corrupted(format!("BKGD value is not a blob: {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_matches_the_documented_byte_layout() {
        let record = Background::Color { r: 65535, g: 32768, b: 0 }
            .to_record("a")
            .unwrap();
        let bytes = match &record.value {
            RecordValue::Blob(bytes) => bytes,
            _ => unreachable!(),
        };
        assert_eq!(&bytes[0..4], b"ClrB");
        assert_eq!(&bytes[4..10], &[0xFF, 0xFF, 0x80, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn default_and_picture_round_trip() {
        for bg in [Background::Default, Background::Picture { alias_len: 200 }] {
            let record = bg.to_record("a").unwrap();
            assert_eq!(Background::from_record(&record).unwrap(), bg);
        }
    }

    #[test]
    fn rejects_unknown_tag() {
        let record = Record::new("a", known::BKGD, RecordValue::Blob(b"XxxB".to_vec())).unwrap();
        assert!(Background::from_record(&record).is_err());
    }
}
