//! Codec Module
//!
//! Partition file format: one columnar batch per file, MessagePack encoded
//! and brotli compressed as a whole.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ brotli stream                                           │
//! │ ┌─────────────────────────────────────────────────────┐ │
//! │ │ msgpack map (2 entries)                             │ │
//! │ │   "columns" → ["postcode", "easting", ...]          │ │
//! │ │   "data"    → { "postcode": [str, ...],             │ │
//! │ │                 "easting":  [f64 | nil, ...],       │ │
//! │ │                 ... one equal-length list per column│ │
//! │ │               }                                     │ │
//! │ └─────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## File Naming
//! `postcodes_<LETTER>.msgpack.br`, one file per leading character.

mod batch;
mod blob;
mod value;

use std::path::{Path, PathBuf};

pub use batch::ColumnBatch;
pub use blob::{compress, decode, decompress, encode};
pub use value::Value;

/// Prefix shared by every partition file name
pub const PARTITION_PREFIX: &str = "postcodes_";

/// Extension for brotli-compressed MessagePack files
pub const PARTITION_EXTENSION: &str = "msgpack.br";

/// File name for a partition key: 'A' → "postcodes_A.msgpack.br"
pub fn partition_filename(key: char) -> String {
    format!("{}{}.{}", PARTITION_PREFIX, key, PARTITION_EXTENSION)
}

/// Full path of the partition file for `key` inside `dir`
pub fn partition_path(dir: &Path, key: char) -> PathBuf {
    dir.join(partition_filename(key))
}

/// Parse a partition key back out of a file name
/// "postcodes_A.msgpack.br" → Some('A')
pub fn parse_partition_key(path: &Path) -> Option<char> {
    let name = path.file_name()?.to_str()?;
    let stem = name
        .strip_prefix(PARTITION_PREFIX)?
        .strip_suffix(PARTITION_EXTENSION)?
        .strip_suffix('.')?;

    let mut chars = stem.chars();
    match (chars.next(), chars.next()) {
        (Some(key), None) => Some(key),
        _ => None,
    }
}
