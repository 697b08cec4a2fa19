//! Trash put-back location (`ptbL`).

use crate::error::{Error, Result};
use crate::fourcc::known;
use crate::record::Record;
use crate::value::RecordValue;

/// Prefixes `path` with `/` unless it already has one.
fn normalize(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

pub fn to_record(filename: impl Into<String>, path: &str) -> Result<Record> {
    Record::new(filename, known::PTBL, RecordValue::Ustr(normalize(path)))
}

pub fn from_record(record: &Record) -> Result<String> {
    if record.type_code != known::PTBL {
        return Err(Error::corrupted(format!(
            "record type {} is not ptbL",
            record.type_code
        )));
    }
    match &record.value {
        RecordValue::Ustr(s) => Ok(s.clone()),
        RecordValue::Blob(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        other => Err(Error::corrupted(format!("ptbL value is neither text nor bytes: {other:?}"))),
    }
}
