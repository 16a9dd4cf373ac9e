//! Column batches
//!
//! Column-major container that is serialized as one partition.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::{PostcodeError, Result};
use crate::schema::{Column, Record, SOURCE_ALIASES};

use super::Value;

/// Ordered set of equal-length columns
///
/// `columns` fixes the column order; `data` holds one sequence per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnBatch {
    pub(super) columns: Vec<String>,
    pub(super) data: IndexMap<String, Vec<Value>>,
}

impl ColumnBatch {
    /// Create an empty batch with no columns
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a batch from a column list and its sequences
    ///
    /// Fails with `CorruptPartition` when the two do not describe the same
    /// set of columns or when the sequences differ in length.
    pub fn from_parts(columns: Vec<String>, data: IndexMap<String, Vec<Value>>) -> Result<Self> {
        let batch = Self { columns, data };
        batch.validate()?;
        Ok(batch)
    }

    /// Append a column; its length must match the existing columns
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();

        if self.data.contains_key(&name) {
            return Err(PostcodeError::Serialization(format!(
                "duplicate column '{}'",
                name
            )));
        }

        if !self.columns.is_empty() && values.len() != self.row_count() {
            return Err(PostcodeError::Serialization(format!(
                "column '{}' has {} values, batch has {} rows",
                name,
                values.len(),
                self.row_count()
            )));
        }

        self.columns.push(name.clone());
        self.data.insert(name, values);
        Ok(())
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values of one column
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.data.get(name).map(|v| v.as_slice())
    }

    /// Number of rows (0 for a batch with no columns)
    pub fn row_count(&self) -> usize {
        self.columns
            .first()
            .and_then(|c| self.data.get(c))
            .map(|v| v.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Bitwise comparison of two batches (floats compared by bit pattern)
    pub fn same_bits(&self, other: &ColumnBatch) -> bool {
        self.columns == other.columns
            && self.columns.iter().all(|name| {
                match (self.data.get(name), other.data.get(name)) {
                    (Some(a), Some(b)) => {
                        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_bits(y))
                    }
                    _ => false,
                }
            })
    }

    /// Shape check shared by construction and decoding
    pub(super) fn validate(&self) -> Result<()> {
        if self.columns.len() != self.data.len() {
            return Err(PostcodeError::corrupt(format!(
                "{} column names but {} value sequences",
                self.columns.len(),
                self.data.len()
            )));
        }

        let mut seen = HashSet::with_capacity(self.columns.len());
        let mut expected_len = None;

        for name in &self.columns {
            if !seen.insert(name.as_str()) {
                return Err(PostcodeError::corrupt(format!(
                    "column '{}' listed twice",
                    name
                )));
            }

            let values = self.data.get(name).ok_or_else(|| {
                PostcodeError::corrupt(format!("column '{}' has no value sequence", name))
            })?;

            match expected_len {
                None => expected_len = Some(values.len()),
                Some(len) if len != values.len() => {
                    return Err(PostcodeError::corrupt(format!(
                        "column '{}' has {} values, expected {}",
                        name,
                        values.len(),
                        len
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    // =========================================================================
    // Typed Conversions
    // =========================================================================

    /// Pivot records into the canonical columns
    pub fn from_records(records: &[Record]) -> Self {
        let mut postcode = Vec::with_capacity(records.len());
        let mut easting = Vec::with_capacity(records.len());
        let mut northing = Vec::with_capacity(records.len());
        let mut local_authority = Vec::with_capacity(records.len());

        for record in records {
            postcode.push(Value::Text(record.postcode.clone()));
            easting.push(Value::from(record.easting));
            northing.push(Value::from(record.northing));
            local_authority.push(Value::from(record.local_authority_code.clone()));
        }

        let mut data = IndexMap::with_capacity(Column::ALL.len());
        data.insert(Column::Postcode.name().to_string(), postcode);
        data.insert(Column::Easting.name().to_string(), easting);
        data.insert(Column::Northing.name().to_string(), northing);
        data.insert(
            Column::LocalAuthorityCode.name().to_string(),
            local_authority,
        );

        Self {
            columns: data.keys().cloned().collect(),
            data,
        }
    }

    /// Pivot the canonical columns back into records
    ///
    /// Each canonical column is found under its own name first, then under
    /// its source aliases (`pcd`, `oseast1m`, ...) in priority order, ignoring
    /// case. Other columns are ignored. A NaN in the local authority column
    /// is read as null, matching producers that encode missing text as NaN.
    pub fn into_records(mut self) -> Result<Vec<Record>> {
        let rows = self.row_count();

        let mut take = |column: Column| -> Result<Vec<Value>> {
            let stored = stored_name(&self.data, column).ok_or_else(|| {
                PostcodeError::corrupt(format!("missing column '{}'", column.name()))
            })?;
            self.data
                .swap_remove(&stored)
                .ok_or_else(|| PostcodeError::corrupt(format!("missing column '{}'", stored)))
        };

        let postcode = take(Column::Postcode)?;
        let easting = take(Column::Easting)?;
        let northing = take(Column::Northing)?;
        let local_authority = take(Column::LocalAuthorityCode)?;

        let mut records = Vec::with_capacity(rows);
        let columns = postcode
            .into_iter()
            .zip(easting)
            .zip(northing)
            .zip(local_authority);

        for (row, (((pcd, east), north), laua)) in columns.enumerate() {
            records.push(Record {
                postcode: text(pcd, row, Column::Postcode)?,
                easting: nullable_float(east, row, Column::Easting)?,
                northing: nullable_float(north, row, Column::Northing)?,
                local_authority_code: nullable_text(laua, row, Column::LocalAuthorityCode)?,
            });
        }

        Ok(records)
    }
}

/// Stored name holding `column`, by canonical name or source alias
fn stored_name(data: &IndexMap<String, Vec<Value>>, column: Column) -> Option<String> {
    let candidates = std::iter::once(column.name()).chain(
        SOURCE_ALIASES
            .iter()
            .filter(|(_, c)| *c == column)
            .map(|(alias, _)| *alias),
    );

    for candidate in candidates {
        if let Some(name) = data.keys().find(|k| k.trim().eq_ignore_ascii_case(candidate)) {
            return Some(name.clone());
        }
    }
    None
}

fn type_error(row: usize, column: Column, value: &Value) -> PostcodeError {
    PostcodeError::corrupt(format!(
        "row {}: unexpected value {:?} in column '{}'",
        row,
        value,
        column.name()
    ))
}

fn text(value: Value, row: usize, column: Column) -> Result<String> {
    match value {
        Value::Text(s) => Ok(s),
        other => Err(type_error(row, column, &other)),
    }
}

fn nullable_float(value: Value, row: usize, column: Column) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Float(f) => Ok(Some(f)),
        other => Err(type_error(row, column, &other)),
    }
}

fn nullable_text(value: Value, row: usize, column: Column) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::Float(f) if f.is_nan() => Ok(None),
        Value::Text(s) => Ok(Some(s)),
        other => Err(type_error(row, column, &other)),
    }
}
