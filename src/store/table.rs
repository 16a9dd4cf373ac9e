//! Resident table
//!
//! Rows merged so far, the derived postcode keys, and the set of loaded
//! partitions.

use std::collections::BTreeSet;

use crate::schema::Record;

/// State guarded by the store's RwLock
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    /// Rows in merge order
    records: Vec<Record>,

    /// `postcode_key` for each row, same length as `records`
    keys: Vec<String>,

    /// Partitions already merged
    loaded: BTreeSet<char>,
}

impl StoreState {
    pub(crate) fn is_loaded(&self, key: char) -> bool {
        self.loaded.contains(&key)
    }

    pub(crate) fn loaded_keys(&self) -> &BTreeSet<char> {
        &self.loaded
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    /// Append a batch of decoded partitions in one step
    ///
    /// Keys are derived for the appended rows only; rows already resident
    /// keep the key they were given on their own merge.
    pub(crate) fn commit(&mut self, staged: Vec<(char, Vec<Record>)>) {
        let added: usize = staged.iter().map(|(_, rows)| rows.len()).sum();
        self.records.reserve(added);
        self.keys.reserve(added);

        for (key, rows) in staged {
            if !self.loaded.insert(key) {
                continue;
            }
            for record in rows {
                self.keys.push(record.postcode_key());
                self.records.push(record);
            }
        }

        debug_assert_eq!(self.records.len(), self.keys.len());
    }

    /// Rows whose key starts with an already normalised prefix
    pub(crate) fn matching(&self, prefix: &str) -> Vec<Record> {
        self.keys
            .iter()
            .zip(&self.records)
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(_, record)| record.clone())
            .collect()
    }
}
