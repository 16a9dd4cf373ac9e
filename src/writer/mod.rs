//! Writer Module
//!
//! Offline batch job that turns a bulk source extract into partition files.
//!
//! ## Responsibilities
//! - Locate the record table inside the extract
//! - Project source columns onto the canonical schema
//! - Group rows by leading postcode character
//! - Encode and write one partition file per character
//!
//! ## Failure Model
//! Every error is fatal for the run. Nothing is rolled back: a failed run
//! may leave some partition files behind, and the caller must treat the
//! output directory as invalid until a run completes.

mod partition;
mod source;

use std::collections::BTreeMap;
use std::path::PathBuf;

pub use partition::{default_flat_path, group_by_partition, PartitionWriter};
pub use source::{discover_extract, is_record_table, parse_records, SourceExtract};

/// A file produced by the writer
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenFile {
    /// Where the file was written
    pub path: PathBuf,
    /// Number of records it holds
    pub rows: usize,
    /// Size on disk in bytes
    pub bytes: u64,
}

/// Result of a partitioning run: one entry per partition key
#[derive(Debug, Clone, Default)]
pub struct PartitionManifest {
    entries: BTreeMap<char, WrittenFile>,
}

impl PartitionManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: char, file: WrittenFile) {
        self.entries.insert(key, file);
    }

    /// Details of one partition
    pub fn get(&self, key: char) -> Option<&WrittenFile> {
        self.entries.get(&key)
    }

    /// Partition keys, sorted
    pub fn keys(&self) -> impl Iterator<Item = char> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &WrittenFile)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Partition key → byte size
    pub fn sizes(&self) -> BTreeMap<char, u64> {
        self.entries.iter().map(|(k, v)| (*k, v.bytes)).collect()
    }

    /// Sum of all partition sizes
    pub fn total_bytes(&self) -> u64 {
        self.entries.values().map(|f| f.bytes).sum()
    }

    /// Sum of all partition row counts
    pub fn total_rows(&self) -> usize {
        self.entries.values().map(|f| f.rows).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
