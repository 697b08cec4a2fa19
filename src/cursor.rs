//! Bounds-checked big-endian cursor over a byte buffer.
//!
//! Mirrors the teacher's split between an immutable, borrowed view for
//! reading and an owned, append-only buffer for writing, except that every
//! operation here is bounds-checked instead of assuming a well-formed
//! on-disk layout.

use crate::error::{Error, Result};

/// A bounds-checked reader over a borrowed byte slice.
pub struct ReadCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ReadCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ReadCursor { data, pos: 0 }
    }

    pub fn at(data: &'a [u8], pos: usize) -> Result<Self> {
        if pos > data.len() {
            return Err(Error::corrupted(format!(
                "seek to {pos} beyond buffer length {}",
                data.len()
            )));
        }
        Ok(ReadCursor { data, pos })
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(Error::corrupted(format!(
                "seek to {pos} beyond buffer length {}",
                self.data.len()
            )));
        }
        self.pos = pos;
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::corrupted(format!(
                "need {n} bytes at offset {} but only {} remain",
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        Ok(u64::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// Reads a length-prefix-free, fixed-count UTF-16BE string.
    pub fn read_utf16be(&mut self, char_count: u32) -> Result<String> {
        let byte_len = (char_count as usize)
            .checked_mul(2)
            .ok_or_else(|| Error::corrupted("UTF-16 character count overflows byte length"))?;
        let bytes = self.take(byte_len)?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).map_err(|_| Error::InvalidUtf16String)
    }

    /// Reads a NUL-terminated or fixed-length ASCII string of `len` bytes.
    pub fn read_ascii(&mut self, len: usize) -> Result<String> {
        let bytes = self.take(len)?;
        if !bytes.is_ascii() {
            return Err(Error::corrupted("expected ASCII bytes"));
        }
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// An append-only, big-endian write buffer.
#[derive(Default)]
pub struct WriteCursor {
    buf: Vec<u8>,
}

impl WriteCursor {
    pub fn new() -> Self {
        WriteCursor { buf: Vec::new() }
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_zeros(&mut self, count: usize) {
        self.buf.resize(self.buf.len() + count, 0);
    }

    pub fn write_utf16be(&mut self, text: &str) {
        for unit in text.encode_utf16() {
            self.write_u16(unit);
        }
    }

    /// Zero-fills up to `offset`. Fails if the cursor is already past it.
    pub fn pad_to(&mut self, offset: usize) -> Result<()> {
        if offset < self.buf.len() {
            return Err(Error::corrupted(format!(
                "cannot pad to {offset}, already at {}",
                self.buf.len()
            )));
        }
        self.write_zeros(offset - self.buf.len());
        Ok(())
    }

    /// Overwrites `len` bytes at `offset` with `bytes`, for patching fields
    /// (e.g. header counters) that are only known after later writes.
    pub fn patch(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        if offset + bytes.len() > self.buf.len() {
            return Err(Error::corrupted("patch range exceeds buffer length"));
        }
        self.buf[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_cursor_bounds_checks() {
        let data = [1u8, 2, 3];
        let mut cur = ReadCursor::new(&data);
        assert_eq!(cur.read_u16().unwrap(), 0x0102);
        assert!(cur.read_u16().is_err());
    }

    #[test]
    fn utf16_round_trips() {
        let mut w = WriteCursor::new();
        w.write_utf16be("App.app");
        let bytes = w.into_bytes();
        let mut r = ReadCursor::new(&bytes);
        assert_eq!(r.read_utf16be(7).unwrap(), "App.app");
    }

    #[test]
    fn pad_to_zero_fills() {
        let mut w = WriteCursor::new();
        w.write_u8(1);
        w.pad_to(4).unwrap();
        assert_eq!(w.bytes(), &[1, 0, 0, 0]);
        assert!(w.pad_to(2).is_err());
    }
}
