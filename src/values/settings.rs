//! Property-list-backed window and view settings (`bwsp`, `icvp`, `lsvp`,
//! `lsvP`, `glvp`).

use plist::{Dictionary, Value};

use crate::error::{Error, Result};
use crate::fourcc::FourCc;
use crate::record::Record;
use crate::value::RecordValue;

/// A decoded settings dictionary. Unknown keys round-trip unchanged because
/// [`Settings::to_record`] always re-serializes the whole dictionary, not
/// just the keys this type knows about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    dict: Dictionary,
}

impl Settings {
    pub fn new() -> Self {
        Settings::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.dict.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.dict.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.dict.remove(key)
    }

    pub fn to_record(&self, filename: impl Into<String>, type_code: FourCc) -> Result<Record> {
        Record::new(
            filename,
            type_code,
            RecordValue::PropertyList(Value::Dictionary(self.dict.clone())),
        )
    }

    pub fn from_record(record: &Record) -> Result<Self> {
        match &record.value {
            RecordValue::PropertyList(Value::Dictionary(dict)) => Ok(Settings { dict: dict.clone() }),
            RecordValue::PropertyList(_) => Err(Error::corrupted("settings property list is not a dictionary")),
            RecordValue::Blob(_) => Err(Error::corrupted("settings blob did not decode as a property list")),
            other => Err(Error::corrupted(format!(
                "settings value is not a property list: {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourcc::known;

    #[test]
    fn round_trips_known_and_unknown_keys() {
        let mut settings = Settings::new();
        settings.set("ShowStatusBar", Value::Boolean(true));
        settings.set("SomeFutureKey", Value::Integer(42.into()));

        let record = settings.to_record("a", known::BWSP).unwrap();
        let back = Settings::from_record(&record).unwrap();
        assert_eq!(back.get("ShowStatusBar"), Some(&Value::Boolean(true)));
        assert_eq!(back.get("SomeFutureKey"), Some(&Value::Integer(42.into())));
    }

    #[test]
    fn rejects_non_plist_blob() {
        let record = Record::new("a", known::ICVP, RecordValue::Blob(vec![1, 2, 3])).unwrap();
        assert!(Settings::from_record(&record).is_err());
    }
}
