//! Buddy-allocator block address encoding.
//!
//! A block address packs a file offset and a power-of-two size into one
//! `u32`: the low 5 bits hold the size exponent `p` (block size `2^p`,
//! `p >= 5`), and the upper 27 bits hold the offset, which must itself be a
//! multiple of `2^p`.

use crate::error::{Error, Result};

pub const MIN_EXPONENT: u32 = 5;
pub const MAX_EXPONENT: u32 = 31;
const EXPONENT_MASK: u32 = 0x1F;

/// Encodes `offset` and size exponent `p` into a packed block address.
///
/// Requires `offset` aligned to `2^p` and `5 <= p <= 31`.
pub fn encode(offset: u32, p: u32) -> Result<u32> {
    if !(MIN_EXPONENT..=MAX_EXPONENT).contains(&p) {
        return Err(Error::corrupted(format!("size exponent {p} out of range")));
    }
    if offset & EXPONENT_MASK != 0 {
        return Err(Error::corrupted(format!(
            "offset 0x{offset:x} not aligned to 32 bytes"
        )));
    }
    let block_size = 1u32 << p;
    if offset % block_size != 0 {
        return Err(Error::corrupted(format!(
            "offset 0x{offset:x} not aligned to block size {block_size}"
        )));
    }
    Ok(offset | p)
}

/// Decodes a packed block address into `(offset, block_size)`.
pub fn decode(address: u32) -> Result<(u32, u32)> {
    let p = address & EXPONENT_MASK;
    if p < MIN_EXPONENT {
        return Err(Error::InvalidBlockAddress(address));
    }
    let offset = address & !EXPONENT_MASK;
    let block_size = 1u32 << p;
    if offset % block_size != 0 {
        return Err(Error::InvalidBlockAddress(address));
    }
    Ok((offset, block_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_for_valid_inputs() {
        for p in MIN_EXPONENT..=MAX_EXPONENT.min(20) {
            let block_size = 1u32 << p;
            for multiple in 0..4u32 {
                let offset = multiple * block_size;
                let addr = encode(offset, p).unwrap();
                assert_eq!(decode(addr).unwrap(), (offset, block_size));
            }
        }
    }

    #[test]
    fn decode_rejects_small_exponent() {
        // p = 3: block size 8, but exponent must be >= 5.
        assert!(decode(3).is_err());
    }

    #[test]
    fn encode_rejects_misaligned_offset() {
        assert!(encode(1, 5).is_err());
        assert!(encode(32, 6).is_err()); // 32 is not a multiple of 64
    }
}
