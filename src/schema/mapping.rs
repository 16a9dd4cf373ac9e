//! Source column mapping
//!
//! Bulk extracts rename their columns between releases (`pcd` became `pcd7`,
//! `laua` became `lad23cd`, `lad25cd`, ...). This table folds every known
//! header back onto a canonical column.

use csv::StringRecord;

use crate::error::{PostcodeError, Result};

use super::Column;

/// Known source headers, in priority order per canonical column
pub const SOURCE_ALIASES: &[(&str, Column)] = &[
    ("pcd7", Column::Postcode),
    ("pcd", Column::Postcode),
    ("pcds", Column::Postcode),
    ("east1m", Column::Easting),
    ("oseast1m", Column::Easting),
    ("north1m", Column::Northing),
    ("osnrth1m", Column::Northing),
    ("lad25cd", Column::LocalAuthorityCode),
    ("lad24cd", Column::LocalAuthorityCode),
    ("lad23cd", Column::LocalAuthorityCode),
    ("laua", Column::LocalAuthorityCode),
];

/// Resolved positions of the canonical columns in one source header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub postcode: usize,
    pub easting: usize,
    pub northing: usize,
    pub local_authority_code: usize,
}

impl ColumnMapping {
    /// Resolve every canonical column against a header row
    ///
    /// Matching is case-insensitive and trims whitespace. The first alias
    /// (in `SOURCE_ALIASES` order) present in the header wins.
    ///
    /// Returns `SchemaMismatch` naming the first canonical column with no alias
    /// in the header.
    pub fn resolve(headers: &StringRecord) -> Result<Self> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
            .collect();

        let find = |column: Column| -> Result<usize> {
            SOURCE_ALIASES
                .iter()
                .filter(|(_, c)| *c == column)
                .find_map(|(alias, _)| normalized.iter().position(|h| h == alias))
                .ok_or_else(|| PostcodeError::SchemaMismatch {
                    column: column.name(),
                    aliases: aliases_for(column),
                })
        };

        Ok(Self {
            postcode: find(Column::Postcode)?,
            easting: find(Column::Easting)?,
            northing: find(Column::Northing)?,
            local_authority_code: find(Column::LocalAuthorityCode)?,
        })
    }

    /// Source position for a canonical column
    pub fn index_of(&self, column: Column) -> usize {
        match column {
            Column::Postcode => self.postcode,
            Column::Easting => self.easting,
            Column::Northing => self.northing,
            Column::LocalAuthorityCode => self.local_authority_code,
        }
    }
}

fn aliases_for(column: Column) -> Vec<&'static str> {
    SOURCE_ALIASES
        .iter()
        .filter(|(_, c)| *c == column)
        .map(|(alias, _)| *alias)
        .collect()
}
