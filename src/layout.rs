//! Assigns file offsets to B-tree nodes and the allocator block, then sizes
//! the allocator (C7).

use std::collections::HashMap;

use crate::allocator::{self, Allocator};
use crate::address;
use crate::btree::writer::{internal_level_count, traversal_order, BuiltTree};
use crate::btree::{BTreeHeader, PAGE_SIZE};
use crate::error::{Error, Result};
use crate::freelist;

/// The root metadata block is pinned at offset 0x20, size 32, block number 1.
pub const ROOT_BLOCK_OFFSET: u32 = 0x20;
pub const ROOT_BLOCK_SIZE: u32 = 32;
pub const ROOT_BLOCK_EXPONENT: u32 = 5;

/// Where the allocator sizing search starts and ends.
const MIN_ALLOCATOR_EXPONENT: u32 = 12;
const MAX_ALLOCATOR_EXPONENT: u32 = 31;

/// The complete placement of every block in the file about to be written.
pub struct Layout {
    pub header: BTreeHeader,
    pub allocator: Allocator,
    pub allocator_offset: u32,
    pub file_end: u32,
    /// Arena index -> assigned block number, for resolving node child
    /// pointers at encode time.
    pub block_numbers: HashMap<usize, u32>,
    /// Arena index -> `(offset, block size)`, in traversal order.
    pub node_placement: Vec<(usize, u32, u32)>,
}

/// Smallest power-of-two block size, at least 32 and at most one page, whose
/// data region (`size - 4`) holds `content_len` bytes.
fn block_size_for_content(content_len: usize) -> Result<u32> {
    let needed = content_len + 4;
    let mut exp = 5u32;
    while (1u32 << exp) < needed as u32 {
        exp += 1;
        if (1u32 << exp) > PAGE_SIZE {
            return Err(Error::corrupted("node content too large to fit in any page-bounded block"));
        }
    }
    Ok(1u32 << exp)
}

fn round_up(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

/// Plans file offsets for every node in `tree`, then grows the allocator
/// block until its serialized form fits the chosen size.
pub fn plan(tree: &BuiltTree) -> Result<Layout> {
    let order = traversal_order(&tree.nodes, tree.root);
    let block_numbers: HashMap<usize, u32> = order
        .iter()
        .enumerate()
        .map(|(i, &idx)| (idx, 2 + i as u32))
        .collect();

    let mut node_placement = Vec::with_capacity(order.len());
    let mut offset = ROOT_BLOCK_OFFSET + ROOT_BLOCK_SIZE;
    for &idx in &order {
        let content_len = tree.nodes[idx].serialized_size();
        let block_size = block_size_for_content(content_len)?;
        offset = round_up(offset, block_size);
        node_placement.push((idx, offset, block_size));
        offset += block_size;
    }
    let offset_after_nodes = offset;

    let block_count = 2 + order.len() as u32;
    let table_len = allocator::block_table_len(block_count);

    let mut exp = MIN_ALLOCATOR_EXPONENT;
    loop {
        if exp > MAX_ALLOCATOR_EXPONENT {
            return Err(Error::corrupted("allocator block does not fit at any size up to 2^31"));
        }

        let block_size = 1u32 << exp;
        let allocator_offset = round_up(offset_after_nodes, block_size);
        let file_end = allocator_offset + block_size;

        let mut allocated_ranges = vec![(ROOT_BLOCK_OFFSET, ROOT_BLOCK_SIZE)];
        for &(_, node_offset, node_size) in &node_placement {
            allocated_ranges.push((node_offset, node_size));
        }
        allocated_ranges.push((allocator_offset, block_size));

        let free_lists = freelist::build(&allocated_ranges, file_end)?;

        let mut block_addresses = vec![0u32; table_len as usize];
        block_addresses[0] = address::encode(allocator_offset, exp)?;
        block_addresses[1] = address::encode(ROOT_BLOCK_OFFSET, ROOT_BLOCK_EXPONENT)?;
        for &(idx, node_offset, node_size) in &node_placement {
            let block_number = block_numbers[&idx];
            block_addresses[block_number as usize] = address::encode(node_offset, node_size.trailing_zeros())?;
        }

        let candidate = Allocator {
            block_count,
            block_addresses,
            table_of_contents: vec![("DSDB".to_string(), 1)],
            free_lists,
        };

        let serialized_len = allocator::serialized_len(&candidate)?;
        if serialized_len <= block_size as usize {
            let header = BTreeHeader {
                root_node_block: block_numbers[&tree.root],
                internal_level_count: internal_level_count(&tree.nodes, tree.root),
                record_count: tree.record_count,
                node_count: order.len() as u32,
                page_size: PAGE_SIZE,
            };
            return Ok(Layout {
                header,
                allocator: candidate,
                allocator_offset,
                file_end,
                block_numbers,
                node_placement,
            });
        }

        exp += 1;
    }
}
