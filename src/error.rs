//! Error types for qlacref-postcodes
//!
//! Provides a unified error type for the writer, the codec and the store.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using PostcodeError
pub type Result<T> = std::result::Result<T, PostcodeError>;

/// Unified error type for postcode store operations
#[derive(Debug, Error)]
pub enum PostcodeError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Source Extract Errors
    // -------------------------------------------------------------------------
    #[error("No postcode source found in {}", .path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Multiple candidate sources found in {}: {}", .path.display(), .candidates.join(", "))]
    AmbiguousSource {
        path: PathBuf,
        candidates: Vec<String>,
    },

    #[error("Source is missing a column for '{column}' (looked for {})", .aliases.join(", "))]
    SchemaMismatch {
        column: &'static str,
        aliases: Vec<&'static str>,
    },

    #[error("Invalid record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // -------------------------------------------------------------------------
    // Partition Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt partition{}: {reason}", describe_key(.key))]
    CorruptPartition { key: Option<char>, reason: String },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PostcodeError {
    /// Build a corruption error that is not yet tied to a partition key
    pub fn corrupt(reason: impl Into<String>) -> Self {
        PostcodeError::CorruptPartition {
            key: None,
            reason: reason.into(),
        }
    }

    /// Attach a partition key to a corruption error; other errors pass through
    pub fn with_key(self, key: char) -> Self {
        match self {
            PostcodeError::CorruptPartition { reason, .. } => PostcodeError::CorruptPartition {
                key: Some(key),
                reason,
            },
            other => other,
        }
    }

    /// Process exit code used by the CLI for this error
    ///
    /// - 10: ambiguous source
    /// - 20: no source found
    /// - 30: schema mismatch
    /// - 40: corrupt partition
    /// - 1: everything else
    pub fn exit_code(&self) -> i32 {
        match self {
            PostcodeError::AmbiguousSource { .. } => 10,
            PostcodeError::SourceNotFound { .. } => 20,
            PostcodeError::SchemaMismatch { .. } => 30,
            PostcodeError::CorruptPartition { .. } => 40,
            _ => 1,
        }
    }
}

fn describe_key(key: &Option<char>) -> String {
    match key {
        Some(k) => format!(" '{}'", k),
        None => String::new(),
    }
}
