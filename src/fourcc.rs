//! Four-ASCII-byte type codes, stored big-endian as a `u32`.

use std::fmt;

/// A four-character code: four ASCII bytes packed into a big-endian `u32`.
///
/// Equality and hashing operate on the integer representation, as required
/// by the container format (a `FourCc` is used both as a value-type tag and
/// as a map key in the allocator's table of contents).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FourCc(pub u32);

impl FourCc {
    /// Build a `FourCc` from four raw bytes. Total: any byte pattern is a
    /// valid `FourCc`, even non-ASCII ones produced by corrupt input.
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        FourCc(u32::from_be_bytes(bytes))
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Build a `FourCc` from a text fragment. Fails unless the input is
    /// exactly four bytes, all ASCII.
    pub fn from_ascii(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.len() != 4 || !bytes.is_ascii() {
            return None;
        }
        Some(FourCc::from_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc({self})")
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.to_bytes() {
            let c = byte as char;
            if c.is_ascii_graphic() || c == ' ' {
                write!(f, "{c}")?;
            } else {
                write!(f, "\\x{byte:02x}")?;
            }
        }
        Ok(())
    }
}

impl From<[u8; 4]> for FourCc {
    fn from(bytes: [u8; 4]) -> Self {
        FourCc::from_bytes(bytes)
    }
}

impl From<u32> for FourCc {
    fn from(value: u32) -> Self {
        FourCc(value)
    }
}

/// Well-known type codes referenced throughout the container.
pub mod known {
    use super::FourCc;

    pub const ILOC: FourCc = FourCc::from_bytes(*b"Iloc");
    pub const BKGD: FourCc = FourCc::from_bytes(*b"BKGD");
    pub const BWSP: FourCc = FourCc::from_bytes(*b"bwsp");
    pub const ICVP: FourCc = FourCc::from_bytes(*b"icvp");
    pub const LSVP: FourCc = FourCc::from_bytes(*b"lsvp");
    pub const LSV_UPPER_P: FourCc = FourCc::from_bytes(*b"lsvP");
    pub const GLVP: FourCc = FourCc::from_bytes(*b"glvp");
    pub const VSTL: FourCc = FourCc::from_bytes(*b"vstl");
    pub const VSRN: FourCc = FourCc::from_bytes(*b"vSrn");
    pub const FWI0: FourCc = FourCc::from_bytes(*b"fwi0");
    pub const CMMT: FourCc = FourCc::from_bytes(*b"cmmt");
    pub const PTBL: FourCc = FourCc::from_bytes(*b"ptbL");
    pub const PICT: FourCc = FourCc::from_bytes(*b"pict");
}
