//! Record definition
//!
//! One row of the postcode reference dataset.

use serde::{Deserialize, Serialize};

/// A single postcode row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Postcode as it appears in the source (may contain spaces)
    pub postcode: String,

    /// OS grid easting in metres
    pub easting: Option<f64>,

    /// OS grid northing in metres
    pub northing: Option<f64>,

    /// Local authority district code
    pub local_authority_code: Option<String>,
}

impl Record {
    pub fn new(
        postcode: impl Into<String>,
        easting: Option<f64>,
        northing: Option<f64>,
        local_authority_code: Option<&str>,
    ) -> Self {
        Self {
            postcode: postcode.into(),
            easting,
            northing,
            local_authority_code: local_authority_code.map(str::to_string),
        }
    }

    /// Whitespace-free, uppercased postcode used for prefix matching
    pub fn postcode_key(&self) -> String {
        normalize_postcode(&self.postcode)
    }

    /// Partition this record belongs to
    pub fn partition_key(&self) -> Option<char> {
        partition_key(&self.postcode)
    }
}

/// Strip all whitespace and uppercase
///
/// "ab1 2cd" → "AB12CD"
pub fn normalize_postcode(postcode: &str) -> String {
    postcode
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Uppercased first non-whitespace character of a postcode
///
/// Returns `None` for blank input.
pub fn partition_key(postcode: &str) -> Option<char> {
    postcode
        .chars()
        .find(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
}
