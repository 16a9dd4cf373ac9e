//! Load reports
//!
//! Per-key outcome of a `load` batch.

use crate::error::PostcodeError;

/// What happened to one requested partition key
#[derive(Debug)]
pub enum PartitionOutcome {
    /// Decoded and merged into the table
    Loaded { rows: usize },

    /// Merged by an earlier call; not read again
    AlreadyLoaded,

    /// No partition file for this key; the dataset has no such postcodes
    Missing,

    /// The file exists but could not be read or decoded
    Failed(PostcodeError),
}

/// Outcomes of one `load` call, in request order
#[derive(Debug, Default)]
pub struct LoadReport {
    outcomes: Vec<(char, PartitionOutcome)>,
}

impl LoadReport {
    pub(crate) fn push(&mut self, key: char, outcome: PartitionOutcome) {
        self.outcomes.push((key, outcome));
    }

    /// Remove and return the first failure, if any
    pub(crate) fn take_failure(&mut self) -> Option<PostcodeError> {
        let index = self
            .outcomes
            .iter()
            .position(|(_, o)| matches!(o, PartitionOutcome::Failed(_)))?;

        match self.outcomes.remove(index).1 {
            PartitionOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// All outcomes in request order
    pub fn outcomes(&self) -> &[(char, PartitionOutcome)] {
        &self.outcomes
    }

    /// Outcome for one key, if it was requested
    pub fn outcome(&self, key: char) -> Option<&PartitionOutcome> {
        self.outcomes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, outcome)| outcome)
    }

    /// Keys newly merged by this call
    pub fn loaded(&self) -> Vec<char> {
        self.keys_where(|o| matches!(o, PartitionOutcome::Loaded { .. }))
    }

    /// Keys with no partition file
    pub fn missing(&self) -> Vec<char> {
        self.keys_where(|o| matches!(o, PartitionOutcome::Missing))
    }

    /// Keys that failed, with their errors
    pub fn failures(&self) -> impl Iterator<Item = (char, &PostcodeError)> {
        self.outcomes.iter().filter_map(|(k, o)| match o {
            PartitionOutcome::Failed(e) => Some((*k, e)),
            _ => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Rows added to the table by this call
    pub fn rows_added(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, o)| match o {
                PartitionOutcome::Loaded { rows } => *rows,
                _ => 0,
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn keys_where(&self, predicate: impl Fn(&PartitionOutcome) -> bool) -> Vec<char> {
        self.outcomes
            .iter()
            .filter(|(_, o)| predicate(o))
            .map(|(k, _)| *k)
            .collect()
    }
}
