//! Allocator block: the block-address table, named table of contents, and
//! the 32 buddy free lists.

use crate::cursor::{ReadCursor, WriteCursor};
use crate::diagnostics::{self, Diagnostic};
use crate::error::{Error, Result};

pub const FREE_LIST_COUNT: usize = 32;
const MIN_BLOCK_TABLE_LEN: u32 = 256;

/// In-memory form of the allocator block.
#[derive(Debug, Clone)]
pub struct Allocator {
    pub block_count: u32,
    /// Indexed by block number; length is `max(256, round_up(block_count, 256))`.
    pub block_addresses: Vec<u32>,
    /// Insertion-ordered name -> block number map. `"DSDB"` is required.
    pub table_of_contents: Vec<(String, u32)>,
    /// `free_lists[i]` holds file offsets of free regions of size `2^i`.
    pub free_lists: Vec<Vec<u32>>,
}

impl Allocator {
    pub fn block_for(&self, name: &str) -> Option<u32> {
        self.table_of_contents
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, block)| *block)
    }

    /// Resolves a block number to its data region within `file`: the block's
    /// address minus the leading 4-byte alignment prefix.
    pub fn block_data<'a>(&self, file: &'a [u8], block_number: u32) -> Result<&'a [u8]> {
        let address = *self
            .block_addresses
            .get(block_number as usize)
            .ok_or_else(|| Error::corrupted(format!("block number {block_number} out of range")))?;
        let (offset, size) = crate::address::decode(address)?;
        if size < 4 {
            return Err(Error::InvalidBlockAddress(address));
        }
        let data_start = offset as usize + 4;
        let data_end = offset as usize + size as usize;
        file.get(data_start..data_end)
            .ok_or_else(|| Error::corrupted(format!("block {block_number} data region out of file bounds")))
    }
}

fn round_up_to_256(n: u32) -> u32 {
    n.div_ceil(256) * 256
}

/// The block-address table length for a given block count: `max(256,
/// roundUp(blockCount, 256))`. Exposed so the layout planner can size the
/// table before the `Allocator` itself is fully built.
pub(crate) fn block_table_len(block_count: u32) -> u32 {
    MIN_BLOCK_TABLE_LEN.max(round_up_to_256(block_count))
}

/// Reads the allocator block starting at the current cursor position.
/// `header_offset`/`header_size` are the allocator offset and size declared
/// in the container preamble, used to cross-check block 0.
pub fn read(
    cur: &mut ReadCursor,
    header_offset: u32,
    header_size: u32,
    on_diagnostic: &mut dyn FnMut(Diagnostic),
) -> Result<Allocator> {
    let block_count = cur.read_u32()?;
    if block_count == 0 {
        return Err(Error::corrupted("allocator block_count is zero"));
    }

    let reserved = cur.read_u32()?;
    if reserved != 0 {
        diagnostics::report(
            on_diagnostic,
            Diagnostic::ReservedNonZero {
                location: "allocator.reserved_after_block_count",
            },
        );
    }

    let table_len = block_table_len(block_count);
    let mut block_addresses = Vec::with_capacity(table_len as usize);
    for _ in 0..table_len {
        block_addresses.push(cur.read_u32()?);
    }
    for (index, &addr) in block_addresses.iter().enumerate() {
        if index as u32 >= block_count && addr != 0 {
            return Err(Error::corrupted(format!(
                "block address table entry {index} beyond block_count is non-zero"
            )));
        }
    }

    let toc_count = cur.read_u32()?;
    if toc_count == 0 || toc_count > block_count {
        return Err(Error::corrupted(format!(
            "table-of-contents count {toc_count} invalid for block_count {block_count}"
        )));
    }
    let mut table_of_contents = Vec::with_capacity(toc_count as usize);
    for _ in 0..toc_count {
        let name_len = cur.read_u8()?;
        if name_len == 0 {
            return Err(Error::corrupted("table-of-contents name length is zero"));
        }
        let name = cur.read_ascii(name_len as usize)?;
        let block_number = cur.read_u32()?;
        if block_number == 0 || block_number >= block_count {
            return Err(Error::corrupted(format!(
                "table-of-contents entry {name:?} points to invalid block {block_number}"
            )));
        }
        if table_of_contents.iter().any(|(n, _): &(String, u32)| n == &name) {
            return Err(Error::corrupted(format!("duplicate table-of-contents name {name:?}")));
        }
        if name != "DSDB" {
            diagnostics::report(
                on_diagnostic,
                Diagnostic::UnknownTableOfContentsName {
                    name: name.clone(),
                    block: block_number,
                },
            );
        }
        table_of_contents.push((name, block_number));
    }
    if !table_of_contents.iter().any(|(n, _)| n == "DSDB") {
        return Err(Error::corrupted("table of contents missing required DSDB entry"));
    }

    let mut free_lists = Vec::with_capacity(FREE_LIST_COUNT);
    for bucket in 0..FREE_LIST_COUNT {
        let count = cur.read_u32()?;
        let mut offsets = Vec::with_capacity(count as usize);
        let bucket_size = 1u32 << bucket;
        for _ in 0..count {
            let offset = cur.read_u32()?;
            if offset % bucket_size != 0 {
                return Err(Error::corrupted(format!(
                    "free list bucket {bucket} offset 0x{offset:x} not aligned to {bucket_size}"
                )));
            }
            offsets.push(offset);
        }
        free_lists.push(offsets);
    }

    let allocator = Allocator {
        block_count,
        block_addresses,
        table_of_contents,
        free_lists,
    };

    let (entry0_offset, entry0_size) = crate::address::decode(allocator.block_addresses[0])?;
    if entry0_offset != header_offset || entry0_size != header_size {
        return Err(Error::corrupted(format!(
            "block 0 address (offset {entry0_offset}, size {entry0_size}) does not match header-declared allocator region (offset {header_offset}, size {header_size})"
        )));
    }

    Ok(allocator)
}

/// Serializes the allocator block. Used both for the final file assembly
/// and, by the layout planner, speculatively to measure its size.
pub fn write(alloc: &Allocator, out: &mut WriteCursor) -> Result<()> {
    out.write_u32(alloc.block_count);
    out.write_u32(0); // reserved

    let table_len = block_table_len(alloc.block_count);
    if alloc.block_addresses.len() as u32 != table_len {
        return Err(Error::corrupted("block address table has the wrong length"));
    }
    for &addr in &alloc.block_addresses {
        out.write_u32(addr);
    }

    out.write_u32(alloc.table_of_contents.len() as u32);
    for (name, block) in &alloc.table_of_contents {
        let bytes = name.as_bytes();
        out.write_u8(bytes.len() as u8);
        out.write_bytes(bytes);
        out.write_u32(*block);
    }

    if alloc.free_lists.len() != FREE_LIST_COUNT {
        return Err(Error::corrupted("allocator must have exactly 32 free lists"));
    }
    for offsets in &alloc.free_lists {
        out.write_u32(offsets.len() as u32);
        for &offset in offsets {
            out.write_u32(offset);
        }
    }

    Ok(())
}

/// Convenience for the layout planner: serializes into a fresh buffer and
/// returns its length.
pub fn serialized_len(alloc: &Allocator) -> Result<usize> {
    let mut out = WriteCursor::new();
    write(alloc, &mut out)?;
    Ok(out.position())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_allocator() -> Allocator {
        Allocator {
            block_count: 2,
            block_addresses: {
                let mut v = vec![0u32; 256];
                v[0] = crate::address::encode(0x1000, 12).unwrap();
                v[1] = crate::address::encode(0x20, 5).unwrap();
                v
            },
            table_of_contents: vec![("DSDB".to_string(), 1)],
            free_lists: vec![Vec::new(); FREE_LIST_COUNT],
        }
    }

    #[test]
    fn round_trips() {
        let alloc = sample_allocator();
        let mut out = WriteCursor::new();
        write(&alloc, &mut out).unwrap();
        let bytes = out.into_bytes();
        let mut cur = ReadCursor::new(&bytes);
        let read_back = read(&mut cur, 0x1000, 1 << 12, &mut |_| {}).unwrap();
        assert_eq!(read_back.block_count, 2);
        assert_eq!(read_back.block_for("DSDB"), Some(1));
    }

    #[test]
    fn rejects_missing_dsdb() {
        let mut alloc = sample_allocator();
        alloc.table_of_contents = vec![("OTHR".to_string(), 1)];
        let mut out = WriteCursor::new();
        write(&alloc, &mut out).unwrap();
        let bytes = out.into_bytes();
        let mut cur = ReadCursor::new(&bytes);
        assert!(read(&mut cur, 0x1000, 1 << 12, &mut |_| {}).is_err());
    }

    #[test]
    fn rejects_header_mismatch() {
        let alloc = sample_allocator();
        let mut out = WriteCursor::new();
        write(&alloc, &mut out).unwrap();
        let bytes = out.into_bytes();
        let mut cur = ReadCursor::new(&bytes);
        assert!(read(&mut cur, 0x2000, 1 << 12, &mut |_| {}).is_err());
    }
}
