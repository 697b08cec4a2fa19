//! View style (`vstl`) and sort key (`vSrn`).

use crate::error::{Error, Result};
use crate::fourcc::{known, FourCc};
use crate::record::Record;
use crate::value::RecordValue;

/// The known `vstl` values.
pub mod view_style {
    use super::FourCc;

    pub const ICON: FourCc = FourCc::from_bytes(*b"icnv");
    pub const COLUMN: FourCc = FourCc::from_bytes(*b"clmv");
    pub const LIST: FourCc = FourCc::from_bytes(*b"Nlsv");
    pub const COVER_FLOW: FourCc = FourCc::from_bytes(*b"Flwv");
}

/// The known `vSrn` values.
pub mod sort_key {
    use super::FourCc;

    pub const NONE: FourCc = FourCc::from_bytes(*b"none");
    pub const NAME: FourCc = FourCc::from_bytes(*b"name");
    pub const KIND: FourCc = FourCc::from_bytes(*b"kind");
    pub const DATE_MODIFIED: FourCc = FourCc::from_bytes(*b"modd");
    pub const DATE_CREATED: FourCc = FourCc::from_bytes(*b"crea");
    pub const SIZE: FourCc = FourCc::from_bytes(*b"size");
    pub const LABEL: FourCc = FourCc::from_bytes(*b"labl");
}

fn type_value_record(filename: impl Into<String>, type_code: FourCc, value: FourCc) -> Result<Record> {
    Record::new(filename, type_code, RecordValue::Type(value))
}

fn type_value_from_record(record: &Record, expected: FourCc) -> Result<FourCc> {
    if record.type_code != expected {
        return Err(Error::corrupted(format!(
            "record type {} does not match expected {expected}",
            record.type_code
        )));
    }
    match &record.value {
        RecordValue::Type(code) => Ok(*code),
        other => Err(Error::corrupted(format!("value is not a type code: {other:?}"))),
    }
}

pub fn view_style_record(filename: impl Into<String>, style: FourCc) -> Result<Record> {
    type_value_record(filename, known::VSTL, style)
}

pub fn view_style_from_record(record: &Record) -> Result<FourCc> {
    type_value_from_record(record, known::VSTL)
}

pub fn sort_key_record(filename: impl Into<String>, key: FourCc) -> Result<Record> {
    type_value_record(filename, known::VSRN, key)
}

pub fn sort_key_from_record(record: &Record) -> Result<FourCc> {
    type_value_from_record(record, known::VSRN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_style_round_trips() {
        let record = view_style_record("a", view_style::COLUMN).unwrap();
        assert_eq!(view_style_from_record(&record).unwrap(), view_style::COLUMN);
    }

    #[test]
    fn sort_key_round_trips() {
        let record = sort_key_record("a", sort_key::DATE_MODIFIED).unwrap();
        assert_eq!(sort_key_from_record(&record).unwrap(), sort_key::DATE_MODIFIED);
    }

    #[test]
    fn rejects_mismatched_type_code() {
        let record = sort_key_record("a", sort_key::NAME).unwrap();
        assert!(view_style_from_record(&record).is_err());
    }
}
