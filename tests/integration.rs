use dscontainer::value::RecordValue;
use dscontainer::{Container, Error, Record};
use dscontainer::fourcc::known;
use dscontainer::values::background::Background;
use dscontainer::values::icon::IconPosition;

#[test]
fn s1_empty_write_read() {
    let container = Container::new();
    let bytes = container.write().unwrap();
    assert_eq!(&bytes[0..8], &[0x00, 0x00, 0x00, 0x01, 0x42, 0x75, 0x64, 0x31]);

    let back = Container::read(&bytes).unwrap();
    assert_eq!(back.len(), 0);
}

#[test]
fn s2_icon_position_round_trip() {
    let mut container = Container::new();
    container.insert(IconPosition::new(140, 180).to_record("App.app").unwrap());

    let bytes = container.write().unwrap();
    let back = Container::read(&bytes).unwrap();

    assert_eq!(back.len(), 1);
    let record = &back.records()[0];
    assert_eq!(record.filename, "App.app");
    assert_eq!(record.type_code, known::ILOC);
    let pos = IconPosition::from_record(record).unwrap();
    assert_eq!(pos, IconPosition::new(140, 180));
}

#[test]
fn s3_ordering_groups_case_variants() {
    let mut container = Container::new();
    container.insert(Record::new("A.txt", known::ILOC, RecordValue::Long(1)).unwrap());
    container.insert(Record::new("a.txt", known::ILOC, RecordValue::Long(2)).unwrap());
    container.insert(Record::new("B.txt", known::ILOC, RecordValue::Long(3)).unwrap());

    let bytes = container.write().unwrap();
    let diagnostics = std::cell::RefCell::new(Vec::new());
    let back = Container::read_with_diagnostics(&bytes, |d| diagnostics.borrow_mut().push(d)).unwrap();

    let names: Vec<&str> = back.records().iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, vec!["A.txt", "a.txt", "B.txt"]);
    assert!(diagnostics.borrow().is_empty());
}

#[test]
fn s4_background_color_byte_layout() {
    let mut container = Container::new();
    container.insert(
        Background::Color { r: 65535, g: 32768, b: 0 }
            .to_record(".")
            .unwrap(),
    );
    let bytes = container.write().unwrap();
    let back = Container::read(&bytes).unwrap();
    let record = &back.records()[0];
    let payload = match &record.value {
        RecordValue::Blob(bytes) => bytes,
        other => panic!("expected a blob, got {other:?}"),
    };
    assert_eq!(&payload[0..4], &[0x43, 0x6C, 0x72, 0x42]);
    assert_eq!(&payload[4..10], &[0xFF, 0xFF, 0x80, 0x00, 0x00, 0x00]);
}

#[test]
fn s5_corruption_detection() {
    let mut container = Container::new();
    container.insert(Record::new("a", known::ILOC, RecordValue::Long(0)).unwrap());
    let valid = container.write().unwrap();

    let mut bad_page_size = valid.clone();
    bad_page_size[0x34..0x38].copy_from_slice(&0x20u32.to_be_bytes());
    assert!(matches!(
        Container::read(&bad_page_size),
        Err(Error::InvalidBTreeHeader(_))
    ));

    let mut bad_allocator_size = valid.clone();
    bad_allocator_size[0x0C..0x10].copy_from_slice(&0x0600u32.to_be_bytes());
    assert!(matches!(Container::read(&bad_allocator_size), Err(Error::Corrupted(_))));
}

#[test]
fn s6_large_tree() {
    let mut container = Container::new();
    for i in 0..1500 {
        container.insert(
            IconPosition::new(i, i)
                .to_record(format!("File-{i:04}.txt"))
                .unwrap(),
        );
    }
    let bytes = container.write().unwrap();
    let back = Container::read(&bytes).unwrap();
    assert_eq!(back.len(), 1500);

    let names: Vec<&str> = back.records().iter().map(|r| r.filename.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn invariant_round_trip_as_multiset_regardless_of_insertion_order() {
    let mut forward = Container::new();
    let mut backward = Container::new();
    let names = ["m.txt", "a.txt", "z.txt", "b.txt"];
    for name in names {
        forward.insert(Record::new(name, known::ILOC, RecordValue::Long(0)).unwrap());
    }
    for name in names.iter().rev() {
        backward.insert(Record::new(*name, known::ILOC, RecordValue::Long(0)).unwrap());
    }

    let forward_bytes = forward.write().unwrap();
    let forward_container = Container::read(&forward_bytes).unwrap();
    let forward_names: std::collections::HashSet<&str> =
        forward_container.records().iter().map(|r| r.filename.as_str()).collect();
    let backward_bytes = backward.write().unwrap();
    let backward_container = Container::read(&backward_bytes).unwrap();
    let backward_names: std::collections::HashSet<&str> =
        backward_container.records().iter().map(|r| r.filename.as_str()).collect();

    assert_eq!(forward_names, backward_names);
}

#[test]
fn invariant_add_remove_sequence_matches_expected_identity_set() {
    let mut container = Container::new();
    container.insert(Record::new("a", known::ILOC, RecordValue::Long(1)).unwrap());
    container.insert(Record::new("b", known::ILOC, RecordValue::Long(2)).unwrap());
    container.remove("a", known::ILOC);
    container.insert(Record::new("a", known::BKGD, RecordValue::Long(3)).unwrap());

    let mut identities: Vec<(&str, dscontainer::FourCc)> =
        container.records().iter().map(|r| r.identity()).collect();
    identities.sort_by_key(|(name, _)| *name);
    assert_eq!(identities, vec![("a", known::BKGD), ("b", known::ILOC)]);
}

#[test]
fn invariant_writer_rejects_nul_filenames() {
    assert!(Record::new("a\0b", known::ILOC, RecordValue::Null).is_err());
}

#[test]
fn invariant_writer_rejects_oversized_records() {
    let huge = Record::new(
        "x".repeat(5000),
        known::ILOC,
        RecordValue::Blob(vec![0u8; 5000]),
    )
    .unwrap();
    let mut container = Container::new();
    container.insert(huge);
    assert!(container.write().is_err());
}

#[test]
fn boundary_empty_container_has_a_single_leaf() {
    let bytes = Container::new().write().unwrap();
    // rootNodeBlock / internalLevelCount / recordCount / nodeCount live at
    // 0x24..0x34, immediately after the 0x20-byte header.
    let root_node_block = u32::from_be_bytes(bytes[0x24..0x28].try_into().unwrap());
    let internal_level_count = u32::from_be_bytes(bytes[0x28..0x2C].try_into().unwrap());
    let record_count = u32::from_be_bytes(bytes[0x2C..0x30].try_into().unwrap());
    let node_count = u32::from_be_bytes(bytes[0x30..0x34].try_into().unwrap());
    assert_eq!(root_node_block, 2);
    assert_eq!(internal_level_count, 0);
    assert_eq!(record_count, 0);
    assert_eq!(node_count, 1);
}
