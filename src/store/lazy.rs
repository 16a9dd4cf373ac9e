//! Lazy postcode store
//!
//! Owns the resident table and pulls partitions in from the data directory
//! on request.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use crate::codec::{self, ColumnBatch};
use crate::config::Config;
use crate::error::{PostcodeError, Result};
use crate::schema::{normalize_postcode, Record};

use super::table::StoreState;
use super::{LoadReport, PartitionOutcome};

/// Decoded partitions waiting to be committed
type Staged = Vec<(char, Vec<Record>)>;

/// Postcode lookup table backed by partition files
///
/// ## Concurrency Model: Single Loader / Multiple Readers
///
/// - **Loads** (`load`/`try_load`): serialized by `load_lock`
///   - Partition files are read and decoded without holding `state`
///   - The decoded batch is committed under one short write lock
///
/// - **Queries**: take a read lock on `state` only
///   - Run concurrently with each other and with the decode phase of a load
///   - Never observe a half-committed batch
pub struct PostcodeStore {
    /// Store configuration
    config: Config,

    /// Resident rows, derived keys and loaded partition set
    state: RwLock<StoreState>,

    /// Serializes load operations
    load_lock: Mutex<()>,
}

impl PostcodeStore {
    /// Create an empty store for the given config
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: RwLock::new(StoreState::default()),
            load_lock: Mutex::new(()),
        }
    }

    /// Create a store reading the environment
    ///
    /// `data_dir`, when given, wins over `QLACREF_DATA_DIR`; without either
    /// the bundled data directory is used.
    pub fn open(data_dir: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().with_env();
        if let Some(dir) = data_dir {
            builder = builder.data_dir(dir);
        }
        Ok(Self::new(builder.build()?))
    }

    /// Load partitions, continuing past failures
    ///
    /// Keys are uppercased and deduplicated. For each key not yet resident:
    /// - a missing file is recorded as `Missing` (not an error)
    /// - an unreadable or corrupt file is recorded as `Failed`
    /// - a decoded file is staged
    ///
    /// All staged partitions are merged in a single commit at the end.
    pub fn load<I>(&self, keys: I) -> LoadReport
    where
        I: IntoIterator<Item = char>,
    {
        self.load_batch(keys, false)
    }

    /// Load partitions, aborting on the first failure
    ///
    /// Nothing is merged if any key fails; the first error is returned.
    pub fn try_load<I>(&self, keys: I) -> Result<LoadReport>
    where
        I: IntoIterator<Item = char>,
    {
        let mut report = self.load_batch(keys, true);
        match report.take_failure() {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }

    /// Rows whose postcode key starts with the normalised `prefix`
    ///
    /// Results keep table order. Only resident partitions are searched; this
    /// never loads anything. An empty (or all-whitespace) prefix matches
    /// every resident row.
    pub fn query(&self, prefix: &str) -> Vec<Record> {
        let needle = normalize_postcode(prefix);
        self.state.read().matching(&needle)
    }

    /// Load the partition for the first character of `partial`, then query
    ///
    /// Returns an empty result for blank input. Corruption of that
    /// partition is returned as an error.
    pub fn search(&self, partial: &str) -> Result<Vec<Record>> {
        let needle = normalize_postcode(partial);
        let Some(key) = needle.chars().next() else {
            return Ok(Vec::new());
        };

        self.try_load([key])?;
        Ok(self.state.read().matching(&needle))
    }

    /// Partition keys present in the data directory, sorted
    ///
    /// A missing data directory has no keys.
    pub fn available_keys(&self) -> Result<Vec<char>> {
        let dir = &self.config.data_dir;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_path = entry.path();

            if file_path.is_file() {
                if let Some(key) = codec::parse_partition_key(&file_path) {
                    keys.push(key);
                }
            }
        }

        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Keys merged so far
    pub fn loaded_keys(&self) -> BTreeSet<char> {
        self.state.read().loaded_keys().clone()
    }

    pub fn is_loaded(&self, key: char) -> bool {
        self.state.read().is_loaded(key.to_ascii_uppercase())
    }

    /// Number of resident rows
    pub fn len(&self) -> usize {
        self.state.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Directory partitions are read from
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    pub fn is_loading_disabled(&self) -> bool {
        self.config.loading_disabled
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Shared body of `load` and `try_load`
    ///
    /// With `abort_on_error`, the first failure ends the batch and nothing
    /// is committed.
    fn load_batch<I>(&self, keys: I, abort_on_error: bool) -> LoadReport
    where
        I: IntoIterator<Item = char>,
    {
        let mut report = LoadReport::default();

        if self.config.loading_disabled {
            tracing::debug!("Partition loading disabled, skipping load");
            return report;
        }

        let _load_guard = self.load_lock.lock();

        let mut staged: Staged = Vec::new();
        for key in dedup_keys(keys) {
            if self.state.read().is_loaded(key) {
                report.push(key, PartitionOutcome::AlreadyLoaded);
                continue;
            }

            match self.read_partition(key) {
                Ok(Some(records)) => {
                    tracing::debug!(key = %key, rows = records.len(), "Decoded partition");
                    report.push(key, PartitionOutcome::Loaded { rows: records.len() });
                    staged.push((key, records));
                }
                Ok(None) => {
                    tracing::debug!(key = %key, "No partition file");
                    report.push(key, PartitionOutcome::Missing);
                }
                Err(e) if abort_on_error => {
                    tracing::warn!(key = %key, error = %e, "Partition failed, aborting load");
                    report.push(key, PartitionOutcome::Failed(e));
                    return report;
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Partition failed, skipping");
                    report.push(key, PartitionOutcome::Failed(e));
                }
            }
        }

        if !staged.is_empty() {
            self.state.write().commit(staged);
        }

        report
    }

    /// Read and decode one partition
    ///
    /// Returns:
    /// - `Ok(Some(records))`: file decoded
    /// - `Ok(None)`: no file for this key (or the key cannot name one)
    /// - `Err(_)`: file present but unreadable or corrupt
    fn read_partition(&self, key: char) -> Result<Option<Vec<Record>>> {
        let path = self.partition_path(key);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            // A key that cannot name a file has no partition
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::InvalidInput) => {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        };

        let records = codec::decode(&bytes)
            .and_then(ColumnBatch::into_records)
            .map_err(|e| e.with_key(key))?;

        if let Some(stray) = records.iter().find(|r| r.partition_key() != Some(key)) {
            return Err(PostcodeError::CorruptPartition {
                key: Some(key),
                reason: format!("postcode '{}' does not belong here", stray.postcode),
            });
        }

        Ok(Some(records))
    }

    fn partition_path(&self, key: char) -> PathBuf {
        codec::partition_path(&self.config.data_dir, key)
    }
}

/// Uppercase keys and drop repeats, keeping first-seen order
fn dedup_keys<I>(keys: I) -> Vec<char>
where
    I: IntoIterator<Item = char>,
{
    let mut seen = BTreeSet::new();
    keys.into_iter()
        .map(|k| k.to_ascii_uppercase())
        .filter(|k| seen.insert(*k))
        .collect()
}
