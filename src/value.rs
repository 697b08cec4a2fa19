//! Record value codec: the tagged union over on-disk value types, and the
//! `dutc` timestamp conversion helpers.

use chrono::{DateTime, TimeZone, Utc};

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::{Error, Result};
use crate::fourcc::FourCc;

/// Seconds between the HFS/Mac epoch (1904-01-01 UTC) and the Unix epoch.
const DUTC_EPOCH_OFFSET_SECS: i64 = 2_082_844_800;
/// `dutc` ticks per second.
const DUTC_SCALE: f64 = 65_536.0;

/// A record's value: a tagged union over every on-disk value type the
/// format defines, plus a `PropertyList` variant that the reader produces
/// when a `blob`'s bytes sniff as a binary or XML property list.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    Bool(bool),
    Long(u32),
    /// Stored in a 4-byte slot on disk; semantically a `u16`.
    Shor(u16),
    Comp(u64),
    /// Raw ticks since the HFS epoch, see [`dutc_to_datetime`] /
    /// [`dutc_from_datetime`].
    Dutc(u64),
    Type(FourCc),
    Ustr(String),
    Blob(Vec<u8>),
    /// A `blob` whose bytes successfully decoded as a property list. The
    /// writer re-serializes this back into `blob` bytes.
    PropertyList(plist::Value),
    Book(Vec<u8>),
    Null,
}

impl RecordValue {
    /// The on-disk 4-byte data-type tag for this value. `Null` encodes as
    /// all-zero bytes (code 0), not an ASCII tag.
    pub fn tag(&self) -> FourCc {
        match self {
            RecordValue::Bool(_) => FourCc::from_bytes(*b"bool"),
            RecordValue::Long(_) => FourCc::from_bytes(*b"long"),
            RecordValue::Shor(_) => FourCc::from_bytes(*b"shor"),
            RecordValue::Comp(_) => FourCc::from_bytes(*b"comp"),
            RecordValue::Dutc(_) => FourCc::from_bytes(*b"dutc"),
            RecordValue::Type(_) => FourCc::from_bytes(*b"type"),
            RecordValue::Ustr(_) => FourCc::from_bytes(*b"ustr"),
            RecordValue::Blob(_) | RecordValue::PropertyList(_) => FourCc::from_bytes(*b"blob"),
            RecordValue::Book(_) => FourCc::from_bytes(*b"book"),
            RecordValue::Null => FourCc(0),
        }
    }

    /// Encoded payload size in bytes, excluding the 4-byte tag.
    pub fn payload_len(&self) -> usize {
        match self {
            RecordValue::Bool(_) => 1,
            RecordValue::Long(_) | RecordValue::Shor(_) => 4,
            RecordValue::Comp(_) | RecordValue::Dutc(_) => 8,
            RecordValue::Type(_) => 4,
            RecordValue::Ustr(s) => 4 + s.encode_utf16().count() * 2,
            RecordValue::Blob(bytes) => 4 + bytes.len(),
            RecordValue::PropertyList(value) => 4 + encode_plist(value).map_or(0, |b| b.len()),
            RecordValue::Book(bytes) => 4 + bytes.len(),
            RecordValue::Null => 0,
        }
    }

    pub fn write(&self, out: &mut WriteCursor) -> Result<()> {
        match self {
            RecordValue::Bool(b) => out.write_u8(if *b { 1 } else { 0 }),
            RecordValue::Long(v) => out.write_u32(*v),
            RecordValue::Shor(v) => out.write_u32(*v as u32),
            RecordValue::Comp(v) => out.write_u64(*v),
            RecordValue::Dutc(v) => out.write_u64(*v),
            RecordValue::Type(code) => out.write_u32(code.raw()),
            RecordValue::Ustr(s) => {
                let count: u32 = s
                    .encode_utf16()
                    .count()
                    .try_into()
                    .map_err(|_| Error::corrupted("ustr length exceeds u32"))?;
                out.write_u32(count);
                out.write_utf16be(s);
            }
            RecordValue::Blob(bytes) => {
                let len: u32 = bytes
                    .len()
                    .try_into()
                    .map_err(|_| Error::corrupted("blob length exceeds u32"))?;
                out.write_u32(len);
                out.write_bytes(bytes);
            }
            RecordValue::PropertyList(value) => {
                let bytes = encode_plist(value)?;
                let len: u32 = bytes
                    .len()
                    .try_into()
                    .map_err(|_| Error::corrupted("property list length exceeds u32"))?;
                out.write_u32(len);
                out.write_bytes(&bytes);
            }
            RecordValue::Book(bytes) => {
                let len: u32 = bytes
                    .len()
                    .try_into()
                    .map_err(|_| Error::corrupted("book length exceeds u32"))?;
                out.write_u32(len);
                out.write_bytes(bytes);
            }
            RecordValue::Null => {}
        }
        Ok(())
    }

    pub fn read(tag: FourCc, cur: &mut ReadCursor) -> Result<RecordValue> {
        match &tag.to_bytes() {
            b"bool" => {
                let byte = cur.read_u8()?;
                if byte > 1 {
                    return Err(Error::corrupted(format!("invalid bool value {byte}")));
                }
                Ok(RecordValue::Bool(byte == 1))
            }
            b"long" => Ok(RecordValue::Long(cur.read_u32()?)),
            b"shor" => {
                let slot = cur.read_u32()?;
                if slot > 0xFFFF {
                    return Err(Error::corrupted(format!(
                        "shor slot 0x{slot:x} exceeds u16 range"
                    )));
                }
                Ok(RecordValue::Shor(slot as u16))
            }
            b"comp" => Ok(RecordValue::Comp(cur.read_u64()?)),
            b"dutc" => Ok(RecordValue::Dutc(cur.read_u64()?)),
            b"type" => Ok(RecordValue::Type(FourCc(cur.read_u32()?))),
            b"ustr" => {
                let count = cur.read_u32()?;
                Ok(RecordValue::Ustr(cur.read_utf16be(count)?))
            }
            b"blob" => {
                let len = cur.read_u32()? as usize;
                let bytes = cur.read_bytes(len)?;
                if looks_like_plist(bytes) {
                    if let Ok(value) = plist::Value::from_reader(std::io::Cursor::new(bytes)) {
                        return Ok(RecordValue::PropertyList(value));
                    }
                }
                Ok(RecordValue::Blob(bytes.to_vec()))
            }
            b"book" => {
                let len = cur.read_u32()? as usize;
                Ok(RecordValue::Book(cur.read_bytes(len)?.to_vec()))
            }
            _ if tag.raw() == 0 => Ok(RecordValue::Null),
            _ => Err(Error::UnknownDataType(tag)),
        }
    }
}

fn looks_like_plist(bytes: &[u8]) -> bool {
    bytes.starts_with(b"bplist") || bytes.starts_with(b"<?xml")
}

fn encode_plist(value: &plist::Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    value.to_writer_binary(&mut buf)?;
    Ok(buf)
}

/// Converts raw `dutc` ticks (1/65536 s since 1904-01-01 UTC) to a UTC wall
/// time. Returns `None` if the resulting instant cannot be represented.
pub fn dutc_to_datetime(ticks: u64) -> Option<DateTime<Utc>> {
    let seconds_since_mac_epoch = ticks as f64 / DUTC_SCALE;
    let unix_seconds = seconds_since_mac_epoch - DUTC_EPOCH_OFFSET_SECS as f64;
    let whole = unix_seconds.floor();
    let nanos = ((unix_seconds - whole) * 1_000_000_000.0).round() as u32;
    Utc.timestamp_opt(whole as i64, nanos).single()
}

/// Converts a UTC wall time to raw `dutc` ticks, rounding toward zero.
/// Fails if the value does not fit in a `u64`.
pub fn dutc_from_datetime(dt: DateTime<Utc>) -> Result<u64> {
    let unix_seconds = dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1e9;
    let mac_seconds = unix_seconds + DUTC_EPOCH_OFFSET_SECS as f64;
    let ticks = (mac_seconds * DUTC_SCALE).trunc();
    if !(0.0..=u64::MAX as f64).contains(&ticks) {
        return Err(Error::corrupted("dutc value outside representable range"));
    }
    Ok(ticks as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: RecordValue) -> RecordValue {
        let mut w = WriteCursor::new();
        value.write(&mut w).unwrap();
        let bytes = w.into_bytes();
        let mut r = ReadCursor::new(&bytes);
        RecordValue::read(value.tag(), &mut r).unwrap()
    }

    #[test]
    fn bool_round_trips() {
        assert_eq!(round_trip(RecordValue::Bool(true)), RecordValue::Bool(true));
        assert_eq!(round_trip(RecordValue::Bool(false)), RecordValue::Bool(false));
    }

    #[test]
    fn shor_rejects_overflow_on_read() {
        let mut w = WriteCursor::new();
        w.write_u32(0x1_0000);
        let bytes = w.into_bytes();
        let mut r = ReadCursor::new(&bytes);
        assert!(RecordValue::read(FourCc::from_bytes(*b"shor"), &mut r).is_err());
    }

    #[test]
    fn ustr_round_trips() {
        let v = RecordValue::Ustr("App.app".to_string());
        assert_eq!(round_trip(v.clone()), v);
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let bytes = [0u8; 4];
        let mut r = ReadCursor::new(&bytes);
        assert!(RecordValue::read(FourCc::from_bytes(*b"zzzz"), &mut r).is_err());
    }

    #[test]
    fn blob_sniffs_plist_and_round_trips_as_blob_on_disk() {
        let mut plist_bytes = Vec::new();
        plist::Value::Boolean(true)
            .to_writer_binary(&mut plist_bytes)
            .unwrap();

        let mut w = WriteCursor::new();
        w.write_u32(plist_bytes.len() as u32);
        w.write_bytes(&plist_bytes);
        let bytes = w.into_bytes();

        let mut r = ReadCursor::new(&bytes);
        let value = RecordValue::read(FourCc::from_bytes(*b"blob"), &mut r).unwrap();
        assert!(matches!(value, RecordValue::PropertyList(_)));
        assert_eq!(value.tag(), FourCc::from_bytes(*b"blob"));
    }

    #[test]
    fn dutc_round_trips_through_datetime() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let ticks = dutc_from_datetime(dt).unwrap();
        let back = dutc_to_datetime(ticks).unwrap();
        assert_eq!(back.timestamp(), dt.timestamp());
    }
}
