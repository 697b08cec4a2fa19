//! Orchestrates every other component into the crate's public entry point:
//! read, mutate, and write a full container (C9).

use std::collections::HashSet;

use crate::address;
use crate::allocator;
use crate::btree::{reader as btree_reader, writer as btree_writer};
use crate::cursor::{ReadCursor, WriteCursor};
use crate::diagnostics::Diagnostic;
use crate::error::{Error, Result};
use crate::fourcc::FourCc;
use crate::layout;
use crate::record::{compare_records, Record};

const ALIGNMENT: u32 = 1;
const MAGIC: u32 = 0x4275_6431; // "Bud1"
const PREFIX_LEN: usize = 36;

/// The in-memory record set for one directory's presentation metadata.
///
/// Records are kept in a plain list plus an identity set for O(1)
/// duplicate checks; the total order over filenames is locale-folded and so
/// cannot serve as a `BTreeMap` key without losing the distinct-identity
/// guarantee for filenames that fold to the same key. Sorting happens once,
/// at [`Container::write`] time.
#[derive(Debug, Clone, Default)]
pub struct Container {
    records: Vec<Record>,
    identities: HashSet<(String, FourCc)>,
}

impl Container {
    pub fn new() -> Self {
        Container::default()
    }

    /// Builds a container from a record list, rejecting duplicate
    /// `(filename, typeCode)` identities.
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        let mut identities = HashSet::with_capacity(records.len());
        for record in &records {
            let identity = (record.filename.clone(), record.type_code);
            if !identities.insert(identity) {
                return Err(Error::corrupted(format!(
                    "duplicate record identity ({:?}, {})",
                    record.filename, record.type_code
                )));
            }
        }
        Ok(Container { records, identities })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inserts `record`, replacing any existing record with the same
    /// `(filename, typeCode)` identity.
    pub fn insert(&mut self, record: Record) {
        let identity = (record.filename.clone(), record.type_code);
        if self.identities.insert(identity.clone()) {
            self.records.push(record);
            return;
        }
        let slot = self
            .records
            .iter_mut()
            .find(|r| r.filename == identity.0 && r.type_code == identity.1)
            .expect("identity tracked in the set but missing from the record list");
        *slot = record;
    }

    /// Removes the record with the given identity. Returns whether one was
    /// present.
    pub fn remove(&mut self, filename: &str, type_code: FourCc) -> bool {
        if !self.identities.remove(&(filename.to_string(), type_code)) {
            return false;
        }
        self.records.retain(|r| !(r.filename == filename && r.type_code == type_code));
        true
    }

    /// Parses a full container file. Non-fatal anomalies are silently
    /// dropped; see [`Container::read_with_diagnostics`] to observe them.
    pub fn read(file: &[u8]) -> Result<Self> {
        Self::read_inner(file, &mut |_| {})
    }

    /// Parses a full container file, invoking `on_diagnostic` for each
    /// non-fatal anomaly observed during the read. `on_diagnostic` is
    /// borrowed only for the duration of this call, so it may close over
    /// state local to the caller (a buffer to collect into, for instance)
    /// instead of needing to own it.
    pub fn read_with_diagnostics(file: &[u8], mut on_diagnostic: impl FnMut(Diagnostic)) -> Result<Self> {
        Self::read_inner(file, &mut on_diagnostic)
    }

    fn read_inner(file: &[u8], on_diagnostic: &mut dyn FnMut(Diagnostic)) -> Result<Self> {
        if file.len() < PREFIX_LEN {
            return Err(Error::InvalidHeader(format!(
                "file of {} bytes is shorter than the {PREFIX_LEN}-byte prefix",
                file.len()
            )));
        }

        let mut cur = ReadCursor::new(&file[..PREFIX_LEN]);
        let alignment = cur.read_u32()?;
        if alignment != ALIGNMENT {
            return Err(Error::InvalidHeader(format!("alignment {alignment} != {ALIGNMENT}")));
        }
        let magic = cur.read_u32()?;
        if magic != MAGIC {
            return Err(Error::InvalidMagic);
        }
        let allocator_offset = cur.read_u32()?;
        let allocator_size = cur.read_u32()?;
        let allocator_offset_check = cur.read_u32()?;
        if allocator_offset_check != allocator_offset {
            return Err(Error::OffsetMismatch {
                header: allocator_offset,
                check: allocator_offset_check,
            });
        }
        let _reserved = cur.read_bytes(16)?;

        log::debug!("container prefix: allocator at 0x{allocator_offset:x}, size {allocator_size}");

        let data_start = allocator_offset as usize + 4;
        let data_end = allocator_offset as usize + allocator_size as usize;
        let allocator_data = file
            .get(data_start..data_end)
            .ok_or_else(|| Error::corrupted("allocator region lies outside the file"))?;
        let mut alloc_cur = ReadCursor::new(allocator_data);
        let allocator = allocator::read(&mut alloc_cur, allocator_offset, allocator_size, on_diagnostic)?;

        let records = btree_reader::read_tree(file, &allocator, on_diagnostic)?;
        Container::from_records(records)
    }

    /// Serializes a fresh container byte-for-byte from the current record
    /// set: sorts by the total order, bulk-loads a new B-tree, plans block
    /// offsets, and rebuilds the allocator and free lists from scratch.
    pub fn write(&self) -> Result<Vec<u8>> {
        let mut sorted = self.records.clone();
        sorted.sort_by(compare_records);
        for pair in sorted.windows(2) {
            if pair[0].identity() == pair[1].identity() {
                return Err(Error::corrupted(format!(
                    "duplicate record identity ({:?}, {})",
                    pair[0].filename, pair[0].type_code
                )));
            }
        }

        let built = btree_writer::build_tree(&sorted)?;
        let plan = layout::plan(&built)?;
        let (allocator_offset, allocator_size) = address::decode(plan.allocator.block_addresses[0])?;

        log::debug!(
            "writing container: {} records, {} nodes, allocator at 0x{allocator_offset:x} size {allocator_size}",
            sorted.len(),
            plan.header.node_count
        );

        let mut out = WriteCursor::new();
        out.write_u32(ALIGNMENT);
        out.write_u32(MAGIC);
        out.write_u32(allocator_offset);
        out.write_u32(allocator_size);
        out.write_u32(allocator_offset);
        out.write_zeros(16);

        out.pad_to(layout::ROOT_BLOCK_OFFSET as usize)?;
        out.write_zeros(4);
        plan.header.write(&mut out);
        out.pad_to((layout::ROOT_BLOCK_OFFSET + layout::ROOT_BLOCK_SIZE) as usize)?;

        for &(idx, offset, size) in &plan.node_placement {
            out.pad_to(offset as usize)?;
            out.write_zeros(4);
            built.nodes[idx].write(&mut out, &|child| plan.block_numbers[&child])?;
            out.pad_to(offset as usize + size as usize)?;
        }

        out.pad_to(allocator_offset as usize)?;
        out.write_zeros(4);
        allocator::write(&plan.allocator, &mut out)?;
        out.pad_to(allocator_offset as usize + allocator_size as usize)?;

        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourcc::known;
    use crate::value::RecordValue;

    #[test]
    fn empty_container_round_trips() {
        let container = Container::new();
        let bytes = container.write().unwrap();
        assert_eq!(&bytes[0..8], &[0, 0, 0, 1, 0x42, 0x75, 0x64, 0x31]);
        let back = Container::read(&bytes).unwrap();
        assert_eq!(back.len(), 0);
    }

    #[test]
    fn insert_and_remove_track_identity() {
        let mut container = Container::new();
        container.insert(Record::new("App.app", known::ILOC, RecordValue::Long(1)).unwrap());
        assert_eq!(container.len(), 1);
        container.insert(Record::new("App.app", known::ILOC, RecordValue::Long(2)).unwrap());
        assert_eq!(container.len(), 1);
        assert_eq!(container.records()[0].value, RecordValue::Long(2));
        assert!(container.remove("App.app", known::ILOC));
        assert!(container.is_empty());
        assert!(!container.remove("App.app", known::ILOC));
    }

    #[test]
    fn icon_position_round_trips_through_bytes() {
        let mut container = Container::new();
        container.insert(
            Record::new(
                "App.app",
                known::ILOC,
                RecordValue::Blob(vec![0, 0, 0, 0x8c, 0, 0, 0, 0xb4, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0, 0]),
            )
            .unwrap(),
        );
        let bytes = container.write().unwrap();
        let back = Container::read(&bytes).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.records()[0].filename, "App.app");
    }

    #[test]
    fn ordering_places_case_variants_adjacent() {
        let mut container = Container::new();
        for name in ["B.txt", "a.txt", "A.txt"] {
            container
                .insert(Record::new(name, known::ILOC, RecordValue::Long(0)).unwrap());
        }
        let bytes = container.write().unwrap();
        let back = Container::read(&bytes).unwrap();
        let names: Vec<&str> = back.records().iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["A.txt", "a.txt", "B.txt"]);
    }

    #[test]
    fn large_container_round_trips() {
        let mut container = Container::new();
        for i in 0..1500 {
            container
                .insert(Record::new(format!("File-{i:04}.txt"), known::ILOC, RecordValue::Long(i)).unwrap());
        }
        let bytes = container.write().unwrap();
        let back = Container::read(&bytes).unwrap();
        assert_eq!(back.len(), 1500);
        let names: Vec<&str> = back.records().iter().map(|r| r.filename.as_str()).collect();
        let mut sorted_names = names.clone();
        sorted_names.sort();
        assert_eq!(names, sorted_names);
    }

    #[test]
    fn corrupted_page_size_is_rejected() {
        let mut container = Container::new();
        container.insert(Record::new("a", known::ILOC, RecordValue::Long(0)).unwrap());
        let mut bytes = container.write().unwrap();
        bytes[0x34..0x38].copy_from_slice(&0x20u32.to_be_bytes());
        assert!(matches!(Container::read(&bytes), Err(Error::InvalidBTreeHeader(_))));
    }

    #[test]
    fn corrupted_allocator_size_is_rejected() {
        let mut container = Container::new();
        container.insert(Record::new("a", known::ILOC, RecordValue::Long(0)).unwrap());
        let mut bytes = container.write().unwrap();
        bytes[0x0C..0x10].copy_from_slice(&0x0600u32.to_be_bytes());
        assert!(matches!(Container::read(&bytes), Err(Error::Corrupted(_))));
    }

    #[test]
    fn read_with_diagnostics_observes_unknown_toc_names() {
        let mut container = Container::new();
        container.insert(Record::new("a", known::ILOC, RecordValue::Long(0)).unwrap());
        let bytes = container.write().unwrap();
        // A clean write never emits a diagnostic; confirm the channel stays silent.
        let seen = std::cell::Cell::new(0);
        let _ = Container::read_with_diagnostics(&bytes, |_| seen.set(seen.get() + 1));
        assert_eq!(seen.get(), 0);
    }
}
