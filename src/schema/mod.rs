//! Schema Module
//!
//! Column definitions shared by the writer and the store.
//!
//! ## Responsibilities
//! - The typed `Record` row
//! - Canonical column names and their value kinds
//! - Mapping from release-specific source headers to canonical columns
//! - Postcode normalisation used for partitioning and prefix matching
//!
//! ## Canonical Columns
//! ```text
//! ┌──────────────────────┬────────────────┐
//! │ postcode             │ text           │
//! │ easting              │ float or null  │
//! │ northing             │ float or null  │
//! │ local_authority_code │ text or null   │
//! └──────────────────────┴────────────────┘
//! ```

mod mapping;
mod record;

pub use mapping::{ColumnMapping, SOURCE_ALIASES};
pub use record::{normalize_postcode, partition_key, Record};

/// Kind of values a canonical column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Non-null text
    Text,
    /// Float or null
    NullableFloat,
    /// Text or null
    NullableText,
}

/// The canonical columns, in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Postcode,
    Easting,
    Northing,
    LocalAuthorityCode,
}

impl Column {
    /// All canonical columns in the order they are written
    pub const ALL: [Column; 4] = [
        Column::Postcode,
        Column::Easting,
        Column::Northing,
        Column::LocalAuthorityCode,
    ];

    /// Name stored in partition files
    pub fn name(self) -> &'static str {
        match self {
            Column::Postcode => "postcode",
            Column::Easting => "easting",
            Column::Northing => "northing",
            Column::LocalAuthorityCode => "local_authority_code",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::Postcode => ColumnKind::Text,
            Column::Easting | Column::Northing => ColumnKind::NullableFloat,
            Column::LocalAuthorityCode => ColumnKind::NullableText,
        }
    }

    /// Look a canonical column up by its stored name
    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// Canonical column names in storage order
pub fn column_names() -> Vec<String> {
    Column::ALL.iter().map(|c| c.name().to_string()).collect()
}
