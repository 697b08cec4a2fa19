//! Bulk-loads a sorted record list into a page-bounded B-tree by right-spine
//! insertion with balanced splits.
//!
//! Nodes live in an arena (`Vec<Node>`) addressed by index, per the target-
//! language equivalent the format's design notes suggest in place of the
//! reference implementation's shared, mutable node graph.

use crate::cursor::WriteCursor;
use crate::error::{Error, Result};
use crate::record::Record;

use super::MAX_NODE_CONTENT;

/// One entry in a node: an optional child (present for internal nodes) and
/// the record that follows it in traversal order.
#[derive(Debug, Clone)]
pub struct Entry {
    pub child: Option<usize>,
    pub record: Record,
}

/// A node in the build-time arena. `rightmost_child.is_none()` marks a leaf.
#[derive(Debug, Clone)]
pub struct Node {
    pub entries: Vec<Entry>,
    pub rightmost_child: Option<usize>,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.rightmost_child.is_none()
    }

    fn overhead_per_entry(&self) -> usize {
        if self.is_leaf() { 0 } else { 4 }
    }

    /// Serialized size in bytes: the 8-byte header plus each entry's
    /// record size and, for internal nodes, its 4-byte child pointer.
    pub fn serialized_size(&self) -> usize {
        let overhead = self.overhead_per_entry();
        8 + self
            .entries
            .iter()
            .map(|e| e.record.encoded_len() + overhead)
            .sum::<usize>()
    }

    /// Encodes this node, resolving arena indices to block numbers via
    /// `resolve`.
    pub fn write(&self, out: &mut WriteCursor, resolve: &dyn Fn(usize) -> u32) -> Result<()> {
        out.write_u32(self.rightmost_child.map_or(0, |idx| resolve(idx)));
        out.write_u32(self.entries.len() as u32);
        for entry in &self.entries {
            if let Some(child) = entry.child {
                out.write_u32(resolve(child));
            }
            entry.record.write(out)?;
        }
        Ok(())
    }
}

/// Result of a bulk build: the node arena and the index of the root node.
pub struct BuiltTree {
    pub nodes: Vec<Node>,
    pub root: usize,
    pub record_count: u32,
}

/// Left-to-right, depth-first traversal order over the arena, starting at
/// `root`: a node precedes its children. Used by the layout planner to
/// assign block numbers "in traversal order" as the format requires.
pub fn traversal_order(nodes: &[Node], root: usize) -> Vec<usize> {
    fn visit(nodes: &[Node], idx: usize, order: &mut Vec<usize>) {
        order.push(idx);
        for entry in &nodes[idx].entries {
            if let Some(child) = entry.child {
                visit(nodes, child, order);
            }
        }
        if let Some(rc) = nodes[idx].rightmost_child {
            visit(nodes, rc, order);
        }
    }
    let mut order = Vec::new();
    visit(nodes, root, &mut order);
    order
}

/// Number of internal (non-leaf) levels in the tree rooted at `root`: zero
/// when the root is a leaf.
pub fn internal_level_count(nodes: &[Node], root: usize) -> u32 {
    fn depth(nodes: &[Node], idx: usize) -> u32 {
        let node = &nodes[idx];
        if node.is_leaf() {
            return 0;
        }
        let mut max_child_depth = 0;
        for entry in &node.entries {
            if let Some(child) = entry.child {
                max_child_depth = max_child_depth.max(depth(nodes, child));
            }
        }
        if let Some(rc) = node.rightmost_child {
            max_child_depth = max_child_depth.max(depth(nodes, rc));
        }
        1 + max_child_depth
    }
    depth(nodes, root)
}

/// Bulk-loads `records`, which must already be in the container's total
/// order, into a fresh page-bounded tree.
pub fn build_tree(records: &[Record]) -> Result<BuiltTree> {
    for record in records {
        if record.encoded_len() + 8 > MAX_NODE_CONTENT {
            return Err(Error::corrupted(format!(
                "record {:?} of type {} is too large to fit in a page",
                record.filename, record.type_code
            )));
        }
    }

    let mut nodes = vec![Node {
        entries: Vec::new(),
        rightmost_child: None,
    }];
    let mut root = 0usize;

    for record in records {
        root = insert(&mut nodes, root, record.clone())?;
    }

    Ok(BuiltTree {
        record_count: records.len() as u32,
        nodes,
        root,
    })
}

/// Appends `record` at the rightmost leaf and bubbles any resulting splits
/// up the right spine, returning the (possibly new) root index.
fn insert(nodes: &mut Vec<Node>, root: usize, record: Record) -> Result<usize> {
    let mut path = vec![root];
    while let Some(child) = nodes[*path.last().unwrap()].rightmost_child {
        path.push(child);
    }
    let leaf = *path.last().unwrap();
    nodes[leaf].entries.push(Entry { child: None, record });

    let mut root = root;
    let mut level = path.len();
    let mut current = leaf;

    loop {
        if nodes[current].serialized_size() <= MAX_NODE_CONTENT {
            break;
        }

        let (right_idx, separator) = split(nodes, current)?;
        level -= 1;

        if level == 0 {
            let new_root = nodes.len();
            nodes.push(Node {
                entries: vec![Entry {
                    child: Some(current),
                    record: separator,
                }],
                rightmost_child: Some(right_idx),
            });
            root = new_root;
            break;
        }

        let parent = path[level - 1];
        nodes[parent].entries.push(Entry {
            child: Some(current),
            record: separator,
        });
        nodes[parent].rightmost_child = Some(right_idx);
        current = parent;
    }

    Ok(root)
}

/// Splits the node at `idx` in place (it becomes the left half), pushes a
/// new node for the right half, and returns `(right_idx, separator_record)`.
fn split(nodes: &mut Vec<Node>, idx: usize) -> Result<(usize, Record)> {
    let is_leaf = nodes[idx].is_leaf();
    let overhead = nodes[idx].overhead_per_entry();
    let entries = std::mem::take(&mut nodes[idx].entries);
    let original_rightmost = nodes[idx].rightmost_child;

    let n = entries.len();
    if n == 0 {
        return Err(Error::corrupted("unable to split an empty node"));
    }

    let sizes: Vec<usize> = entries.iter().map(|e| e.record.encoded_len() + overhead).collect();
    let mut prefix = vec![0usize; n + 1];
    for i in 0..n {
        prefix[i + 1] = prefix[i] + sizes[i];
    }
    let total = prefix[n];

    let fits = |left: usize, right: usize| left <= MAX_NODE_CONTENT && right <= MAX_NODE_CONTENT;
    let size_for = |k: usize| -> (usize, usize) {
        let left = 8 + prefix[k];
        let right = 8 + (total - prefix[k + 1]);
        (left, right)
    };

    let mut best: Option<usize> = None;
    // Prefer a split where both sides are non-empty.
    for k in 0..n {
        if k == 0 || k == n - 1 {
            continue;
        }
        let (left, right) = size_for(k);
        if fits(left, right) {
            let diff = left.abs_diff(right);
            if best.map_or(true, |b| diff < size_for(b).0.abs_diff(size_for(b).1)) {
                best = Some(k);
            }
        }
    }
    if best.is_none() {
        for k in 0..n {
            let (left, right) = size_for(k);
            if fits(left, right) {
                let diff = left.abs_diff(right);
                if best.map_or(true, |b| diff < size_for(b).0.abs_diff(size_for(b).1)) {
                    best = Some(k);
                }
            }
        }
    }
    let k = best.ok_or_else(|| Error::corrupted("unable to split"))?;

    let mut entries = entries;
    let right_entries = entries.split_off(k + 1);
    let separator_entry = entries.pop().unwrap();
    let separator = separator_entry.record;
    let left_entries = entries;

    // The separator's own child covered the gap immediately left of it;
    // once the separator is promoted, that subtree becomes the left node's
    // new rightmost child.
    let left_rightmost = if is_leaf { None } else { separator_entry.child };

    nodes[idx].entries = left_entries;
    nodes[idx].rightmost_child = left_rightmost;

    let right_node = Node {
        entries: right_entries,
        rightmost_child: if is_leaf { None } else { original_rightmost },
    };
    let right_idx = nodes.len();
    nodes.push(right_node);

    Ok((right_idx, separator))
}
