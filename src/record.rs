//! The user-visible unit of metadata: `(filename, typeCode, value)`.

use std::cmp::Ordering;

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::{Error, Result};
use crate::fourcc::FourCc;
use crate::ordering::compare_filenames;
use crate::value::RecordValue;

/// Sentinel filename denoting the directory itself.
pub const SELF_FILENAME: &str = ".";

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub filename: String,
    pub type_code: FourCc,
    pub value: RecordValue,
}

impl Record {
    pub fn new(
        filename: impl Into<String>,
        type_code: FourCc,
        value: RecordValue,
    ) -> Result<Self> {
        let filename = filename.into();
        validate_filename(&filename)?;
        Ok(Record {
            filename,
            type_code,
            value,
        })
    }

    /// Identity used for deduplication: `(filename, typeCode)`.
    pub fn identity(&self) -> (&str, FourCc) {
        (&self.filename, self.type_code)
    }

    /// Size of this record's encoded form, including the filename length
    /// prefix, filename bytes, type code, value tag, and value payload.
    pub fn encoded_len(&self) -> usize {
        4 + self.filename.encode_utf16().count() * 2 + 4 + 4 + self.value.payload_len()
    }

    /// Encodes `filename length | filename | typeCode | value tag | value payload`.
    pub fn write(&self, out: &mut WriteCursor) -> Result<()> {
        let name_len: u32 = self
            .filename
            .encode_utf16()
            .count()
            .try_into()
            .map_err(|_| Error::corrupted("filename length exceeds u32"))?;
        out.write_u32(name_len);
        out.write_utf16be(&self.filename);
        out.write_u32(self.type_code.raw());
        out.write_u32(self.value.tag().raw());
        self.value.write(out)
    }

    pub fn read(cur: &mut ReadCursor) -> Result<Record> {
        let name_len = cur.read_u32()?;
        let filename = cur.read_utf16be(name_len)?;
        validate_filename(&filename)?;
        let type_code = FourCc(cur.read_u32()?);
        let value_tag = FourCc(cur.read_u32()?);
        let value = RecordValue::read(value_tag, cur)?;
        Ok(Record {
            filename,
            type_code,
            value,
        })
    }
}

/// Validates a filename against the constraints the format places on it:
/// no embedded NUL, and a UTF-16 code unit count fitting in `u32`.
pub fn validate_filename(filename: &str) -> Result<()> {
    if filename.contains('\0') {
        return Err(Error::corrupted("filename contains U+0000"));
    }
    let count = filename.encode_utf16().count();
    if u32::try_from(count).is_err() {
        return Err(Error::corrupted("filename length exceeds u32 code units"));
    }
    Ok(())
}

/// The container's total order over records: by folded filename, then by
/// raw `typeCode`.
pub fn compare_records(a: &Record, b: &Record) -> Ordering {
    compare_filenames(&a.filename, &b.filename).then_with(|| a.type_code.raw().cmp(&b.type_code.raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourcc::known;

    #[test]
    fn rejects_embedded_nul() {
        assert!(Record::new("a\0b", known::ILOC, RecordValue::Null).is_err());
    }

    #[test]
    fn identity_is_filename_and_type_code() {
        let r = Record::new("a.txt", known::ILOC, RecordValue::Null).unwrap();
        assert_eq!(r.identity(), ("a.txt", known::ILOC));
    }

    #[test]
    fn ordering_is_case_insensitive_then_by_type_code() {
        let a = Record::new("a.txt", known::ILOC, RecordValue::Null).unwrap();
        let upper_a = Record::new("A.txt", known::BKGD, RecordValue::Null).unwrap();
        // Same folded filename; BKGD (0x424b4744) < Iloc (0x496c6f63).
        assert_eq!(compare_records(&upper_a, &a), Ordering::Less);
    }

    #[test]
    fn record_round_trips_through_bytes() {
        let r = Record::new(
            "App.app",
            known::ILOC,
            RecordValue::Blob(vec![0, 0, 0, 0x8c, 0, 0, 0, 0xb4]),
        )
        .unwrap();
        let mut w = WriteCursor::new();
        r.write(&mut w).unwrap();
        assert_eq!(w.position(), r.encoded_len());
        let bytes = w.into_bytes();
        let mut c = ReadCursor::new(&bytes);
        assert_eq!(Record::read(&mut c).unwrap(), r);
    }
}
