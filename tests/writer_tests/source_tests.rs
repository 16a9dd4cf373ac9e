//! Tests for source extract handling
//!
//! These tests verify:
//! - Record table name matching
//! - CSV parsing and column projection
//! - Extract auto-discovery in a directory

#[path = "../common/mod.rs"]
mod common;

use std::fs;

use common::{sample_records, setup_temp_dir, write_extract, SAMPLE_CSV, SAMPLE_ENTRY};
use qlacref_postcodes::writer::{discover_extract, is_record_table, parse_records, SourceExtract};
use qlacref_postcodes::{PostcodeError, Record};

// =============================================================================
// Name Matching Tests
// =============================================================================

#[test]
fn test_record_table_names() {
    assert!(is_record_table("Data/NSPL_FEB_2025_UK.csv"));
    assert!(is_record_table("NSPD_AUG_2025_UK.csv"));
    assert!(is_record_table("Data/NSPL21_MAY_2023_UK.csv"));
    assert!(is_record_table("data/nspl_feb_2025_uk.CSV"));
}

#[test]
fn test_non_record_table_names() {
    assert!(!is_record_table("Data/multi_csv/NSPL_FEB_2025_UK_AB.csv"));
    assert!(!is_record_table("Documents/NSPL_FEB_2025_UK.pdf"));
    assert!(!is_record_table("User Guide/LA_UA names and codes UK as at 04_25.csv"));
    assert!(!is_record_table("ONSPD_FEB_2025_UK.csv"));
}

// =============================================================================
// Parsing Tests
// =============================================================================

#[test]
fn test_parse_sample_csv() {
    let records = parse_records(SAMPLE_CSV.as_bytes()).unwrap();

    assert_eq!(records, sample_records());
}

#[test]
fn test_parse_empty_cells_are_null() {
    let csv = "pcd,oseast1m,osnrth1m,laua\nBX1 1LT, , ,  \n";

    let records = parse_records(csv.as_bytes()).unwrap();

    assert_eq!(records, vec![Record::new("BX1 1LT", None, None, None)]);
}

#[test]
fn test_parse_decimal_coordinates() {
    let csv = "pcd7,east1m,north1m,lad25cd\nAB1 0AA,385386.5,801193.25,S12000033\n";

    let records = parse_records(csv.as_bytes()).unwrap();

    assert_eq!(records[0].easting, Some(385386.5));
    assert_eq!(records[0].northing, Some(801193.25));
}

#[test]
fn test_parse_empty_postcode_is_fatal() {
    let csv = "pcd7,east1m,north1m,lad25cd\n,1,2,S12000033\n";

    let result = parse_records(csv.as_bytes());

    assert!(matches!(result, Err(PostcodeError::InvalidRecord { line: 2, .. })));
}

#[test]
fn test_parse_ragged_row_is_fatal() {
    let csv = "pcd7,east1m,north1m,lad25cd\nAB1 0AA,1,2\n";

    let result = parse_records(csv.as_bytes());

    assert!(matches!(result, Err(PostcodeError::Csv(_))));
}

#[test]
fn test_parse_header_only() {
    let csv = "pcd7,east1m,north1m,lad25cd\n";

    assert!(parse_records(csv.as_bytes()).unwrap().is_empty());
}

// =============================================================================
// Extract Tests
// =============================================================================

#[test]
fn test_open_locates_nested_table() {
    let (_temp, dir) = setup_temp_dir();
    let path = common::write_sample_extract(&dir);

    let mut extract = SourceExtract::open(&path).unwrap();

    assert_eq!(extract.entry_name(), SAMPLE_ENTRY);
    assert_eq!(extract.path(), path.as_path());
    assert_eq!(extract.read_records().unwrap(), sample_records());
}

#[test]
fn test_open_ambiguous_lists_candidates() {
    let (_temp, dir) = setup_temp_dir();
    let path = write_extract(
        &dir,
        "two.zip",
        &[("b/NSPL_X_UK.csv", SAMPLE_CSV), ("a/NSPL_Y_UK.csv", SAMPLE_CSV)],
    );

    match SourceExtract::open(&path) {
        Err(PostcodeError::AmbiguousSource { candidates, .. }) => {
            assert_eq!(candidates, vec!["a/NSPL_Y_UK.csv", "b/NSPL_X_UK.csv"]);
        }
        Err(other) => panic!("expected AmbiguousSource, got {:?}", other),
        Ok(_) => panic!("expected AmbiguousSource"),
    }
}

// =============================================================================
// Discovery Tests
// =============================================================================

#[test]
fn test_discover_single_zip() {
    let (_temp, dir) = setup_temp_dir();
    let path = common::write_sample_extract(&dir);
    fs::write(dir.join("notes.txt"), "ignored").unwrap();

    assert_eq!(discover_extract(&dir).unwrap(), path);
}

#[test]
fn test_discover_no_zip() {
    let (_temp, dir) = setup_temp_dir();

    let err = discover_extract(&dir).unwrap_err();

    assert!(matches!(err, PostcodeError::SourceNotFound { .. }));
    assert_eq!(err.exit_code(), 20);
}

#[test]
fn test_discover_missing_dir() {
    let (_temp, dir) = setup_temp_dir();

    let err = discover_extract(&dir.join("source")).unwrap_err();

    assert!(matches!(err, PostcodeError::SourceNotFound { .. }));
}

#[test]
fn test_discover_multiple_zips() {
    let (_temp, dir) = setup_temp_dir();
    write_extract(&dir, "a.zip", &[(SAMPLE_ENTRY, SAMPLE_CSV)]);
    write_extract(&dir, "b.ZIP", &[(SAMPLE_ENTRY, SAMPLE_CSV)]);

    let err = discover_extract(&dir).unwrap_err();

    match &err {
        PostcodeError::AmbiguousSource { candidates, .. } => assert_eq!(candidates.len(), 2),
        other => panic!("expected AmbiguousSource, got {:?}", other),
    }
    assert_eq!(err.exit_code(), 10);
}
