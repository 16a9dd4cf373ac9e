//! Tests for PartitionWriter
//!
//! These tests verify:
//! - One partition file per leading character
//! - Partition purity and source order within partitions
//! - Manifest sizes and totals
//! - Fatal source errors and their exit codes
//! - Flat table conversion

#[path = "../common/mod.rs"]
mod common;

use std::fs;
use std::path::Path;

use common::{postcodes, sample_records, setup_temp_dir, test_config, write_extract};
use qlacref_postcodes::codec::{self, partition_path};
use qlacref_postcodes::schema::normalize_postcode;
use qlacref_postcodes::writer::{default_flat_path, group_by_partition};
use qlacref_postcodes::{PartitionWriter, PostcodeError, Record};

// =============================================================================
// Helper Functions
// =============================================================================

fn read_partition(dir: &Path, key: char) -> Vec<Record> {
    let bytes = fs::read(partition_path(dir, key)).unwrap();
    codec::decode(&bytes).unwrap().into_records().unwrap()
}

fn writer_for(dir: &Path) -> PartitionWriter {
    PartitionWriter::new(&test_config(dir))
}

// =============================================================================
// Partitioning Tests
// =============================================================================

#[test]
fn test_write_records_one_file_per_letter() {
    let (_temp, dir) = setup_temp_dir();

    let manifest = writer_for(&dir).write_records(sample_records(), &dir).unwrap();

    assert_eq!(manifest.keys().collect::<Vec<_>>(), vec!['A', 'B', 'E']);
    for key in ['A', 'B', 'E'] {
        assert!(partition_path(&dir, key).exists());
    }
    assert!(!partition_path(&dir, 'C').exists());
}

#[test]
fn test_partition_purity() {
    let (_temp, dir) = setup_temp_dir();

    let manifest = writer_for(&dir).write_records(sample_records(), &dir).unwrap();

    for key in manifest.keys() {
        for record in read_partition(&dir, key) {
            assert_eq!(normalize_postcode(&record.postcode).chars().next(), Some(key));
        }
    }
}

#[test]
fn test_partition_keeps_source_order_and_form() {
    let (_temp, dir) = setup_temp_dir();

    writer_for(&dir).write_records(sample_records(), &dir).unwrap();

    let b = read_partition(&dir, 'B');
    assert_eq!(postcodes(&b), vec!["B1  1AA", "BX1 1LT", "b2  4QA"]);

    let a = read_partition(&dir, 'A');
    assert_eq!(postcodes(&a), vec!["AB1 0AA", "AB1 0AB"]);
}

#[test]
fn test_partition_preserves_nulls() {
    let (_temp, dir) = setup_temp_dir();

    writer_for(&dir).write_records(sample_records(), &dir).unwrap();

    let b = read_partition(&dir, 'B');
    assert_eq!(b[1], Record::new("BX1 1LT", None, None, None));
}

#[test]
fn test_manifest_sizes_match_files() {
    let (_temp, dir) = setup_temp_dir();

    let manifest = writer_for(&dir).write_records(sample_records(), &dir).unwrap();

    let mut total = 0;
    for (key, size) in manifest.sizes() {
        let on_disk = fs::metadata(partition_path(&dir, key)).unwrap().len();
        assert_eq!(size, on_disk);
        total += on_disk;
    }
    assert_eq!(manifest.total_bytes(), total);
    assert_eq!(manifest.total_rows(), 6);
    assert_eq!(manifest.get('B').unwrap().rows, 3);
    assert_eq!(manifest.len(), 3);
}

#[test]
fn test_write_records_creates_output_dir() {
    let (_temp, dir) = setup_temp_dir();
    let out = dir.join("nested").join("data");

    writer_for(&dir).write_records(sample_records(), &out).unwrap();

    assert!(partition_path(&out, 'A').exists());
}

#[test]
fn test_rewrite_overwrites_partitions() {
    let (_temp, dir) = setup_temp_dir();
    let writer = writer_for(&dir);

    writer.write_records(sample_records(), &dir).unwrap();
    writer
        .write_records(vec![Record::new("AZ9 9ZZ", None, None, None)], &dir)
        .unwrap();

    assert_eq!(postcodes(&read_partition(&dir, 'A')), vec!["AZ9 9ZZ"]);
}

#[test]
fn test_uncommon_leading_characters_are_discovered() {
    let (_temp, dir) = setup_temp_dir();
    let records = vec![
        Record::new("GIR 0AA", None, None, None),
        Record::new("9Z9 9ZZ", None, None, None),
    ];

    let manifest = writer_for(&dir).write_records(records, &dir).unwrap();

    assert_eq!(manifest.keys().collect::<Vec<_>>(), vec!['9', 'G']);
}

#[test]
fn test_group_by_partition_rejects_blank_postcode() {
    let records = vec![
        Record::new("AB1 0AA", None, None, None),
        Record::new("  ", None, None, None),
    ];

    match group_by_partition(records) {
        Err(PostcodeError::InvalidRecord { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected InvalidRecord, got {:?}", other),
    }
}

#[test]
fn test_group_by_partition_first_seen_order() {
    let groups = group_by_partition(sample_records()).unwrap();

    assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec!['A', 'B', 'E']);
}

// =============================================================================
// Extract Tests
// =============================================================================

#[test]
fn test_write_all_from_extract() {
    let (_temp, dir) = setup_temp_dir();
    let extract = common::write_sample_extract(&dir);
    let out = dir.join("out");

    let manifest = writer_for(&dir).write_all(&extract, &out).unwrap();

    assert_eq!(manifest.total_rows(), 6);
    assert_eq!(read_partition(&out, 'E'), vec![sample_records()[4].clone()]);
}

#[test]
fn test_write_all_source_not_found() {
    let (_temp, dir) = setup_temp_dir();
    let extract = write_extract(&dir, "empty.zip", &[("readme.txt", "nothing here")]);

    let err = writer_for(&dir).write_all(&extract, &dir).unwrap_err();

    assert!(matches!(err, PostcodeError::SourceNotFound { .. }));
    assert_eq!(err.exit_code(), 20);
    assert!(err.to_string().contains("empty.zip"));
}

#[test]
fn test_write_all_ambiguous_source() {
    let (_temp, dir) = setup_temp_dir();
    let extract = write_extract(
        &dir,
        "double.zip",
        &[
            ("Data/NSPL_FEB_2025_UK.csv", common::SAMPLE_CSV),
            ("Data/NSPD_FEB_2025_UK.csv", common::SAMPLE_CSV),
        ],
    );

    let err = writer_for(&dir).write_all(&extract, &dir).unwrap_err();

    match &err {
        PostcodeError::AmbiguousSource { candidates, .. } => assert_eq!(candidates.len(), 2),
        other => panic!("expected AmbiguousSource, got {:?}", other),
    }
    assert_eq!(err.exit_code(), 10);
}

#[test]
fn test_write_all_schema_mismatch_writes_nothing() {
    let (_temp, dir) = setup_temp_dir();
    let extract = write_extract(
        &dir,
        "old.zip",
        &[("NSPL_MAY_2020_UK.csv", "pcd,oseast1m,laua\nAB1 0AA,385386,S12000033\n")],
    );
    let out = dir.join("out");

    let err = writer_for(&dir).write_all(&extract, &out).unwrap_err();

    match &err {
        PostcodeError::SchemaMismatch { column, .. } => assert_eq!(*column, "northing"),
        other => panic!("expected SchemaMismatch, got {:?}", other),
    }
    assert_eq!(err.exit_code(), 30);
    assert!(!out.exists());
}

#[test]
fn test_write_all_bad_row_is_fatal() {
    let (_temp, dir) = setup_temp_dir();
    let csv = "pcd7,east1m,north1m,lad25cd\nAB1 0AA,385386,801193,S12000033\nAB1 0AB,east,801314,S12000033\n";
    let extract = write_extract(&dir, "bad.zip", &[("NSPL_FEB_2025_UK.csv", csv)]);
    let out = dir.join("out");

    let err = writer_for(&dir).write_all(&extract, &out).unwrap_err();

    match err {
        PostcodeError::InvalidRecord { line, reason } => {
            assert_eq!(line, 3);
            assert!(reason.contains("easting"));
        }
        other => panic!("expected InvalidRecord, got {:?}", other),
    }
    assert!(!partition_path(&out, 'A').exists());
}

#[test]
fn test_write_all_missing_file() {
    let (_temp, dir) = setup_temp_dir();

    let err = writer_for(&dir)
        .write_all(&dir.join("missing.zip"), &dir)
        .unwrap_err();

    assert!(matches!(err, PostcodeError::Io(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_write_all_not_a_zip() {
    let (_temp, dir) = setup_temp_dir();
    let path = dir.join("fake.zip");
    fs::write(&path, b"plain text").unwrap();

    let err = writer_for(&dir).write_all(&path, &dir).unwrap_err();

    assert!(matches!(err, PostcodeError::Zip(_)));
}

// =============================================================================
// Convert Tests
// =============================================================================

#[test]
fn test_convert_writes_single_flat_file() {
    let (_temp, dir) = setup_temp_dir();
    let extract = common::write_sample_extract(&dir);
    let output = dir.join("flat").join("all.msgpack.br");

    let written = writer_for(&dir).convert(&extract, &output).unwrap();

    assert_eq!(written.rows, 6);
    assert_eq!(written.bytes, fs::metadata(&output).unwrap().len());

    let records = codec::decode(&fs::read(&output).unwrap())
        .unwrap()
        .into_records()
        .unwrap();
    assert_eq!(records, sample_records());
}

#[test]
fn test_default_flat_path() {
    assert_eq!(
        default_flat_path(Path::new("/tmp/NSPL_FEB_2025.zip")),
        Path::new("/tmp/NSPL_FEB_2025.msgpack.br")
    );
}
