//! Bulk source extract
//!
//! The extract is a zip archive holding exactly one postcode CSV among other
//! resources (user guides, lookup tables, per-region splits).

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use zip::ZipArchive;

use crate::error::{PostcodeError, Result};
use crate::schema::{ColumnMapping, Record};

/// Name pattern of the record-bearing CSV, applied to the entry's base name
///
/// Matches `NSPL_FEB_2024_UK.csv`, `NSPL21_MAY_2023_UK.csv`,
/// `NSPD_AUG_2025_UK.csv`; rejects regional splits like `..._UK_AB.csv`.
const RECORD_TABLE_PATTERN: &str = r"(?i)^NSP[DL][^/\\]*_UK\.csv$";

fn record_table_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(RECORD_TABLE_PATTERN).expect("record table pattern is valid"))
}

/// Whether an archive entry name looks like the record table
pub fn is_record_table(entry_name: &str) -> bool {
    let base = entry_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(entry_name);
    record_table_regex().is_match(base)
}

/// An opened bulk extract with its record table located
pub struct SourceExtract {
    path: PathBuf,
    archive: ZipArchive<File>,
    entry_name: String,
}

impl SourceExtract {
    /// Open an extract and locate its single record table
    ///
    /// Errors:
    /// - `SourceNotFound` when no entry matches the record table pattern
    /// - `AmbiguousSource` when more than one does
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file)?;

        let mut candidates: Vec<String> = archive
            .file_names()
            .filter(|name| !name.ends_with('/') && is_record_table(name))
            .map(str::to_string)
            .collect();

        let entry_name = match candidates.len() {
            0 => {
                return Err(PostcodeError::SourceNotFound {
                    path: path.to_path_buf(),
                })
            }
            1 => candidates.remove(0),
            _ => {
                candidates.sort();
                return Err(PostcodeError::AmbiguousSource {
                    path: path.to_path_buf(),
                    candidates,
                });
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            archive,
            entry_name,
        })
    }

    /// Path of the archive on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the record table inside the archive
    pub fn entry_name(&self) -> &str {
        &self.entry_name
    }

    /// Parse every row of the record table
    ///
    /// Any undecodable row aborts the whole read.
    pub fn read_records(&mut self) -> Result<Vec<Record>> {
        tracing::info!(entry = %self.entry_name, "Parsing source table");
        let entry = self.archive.by_name(&self.entry_name)?;
        parse_records(entry)
    }
}

/// Parse a postcode CSV stream into records
///
/// The header row is resolved against the source column mapping first, so a
/// release missing a required column fails before any row is read.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mapping = ColumnMapping::resolve(&headers)?;

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let field = |index: usize| row.get(index).unwrap_or("");

        let postcode = field(mapping.postcode);
        if postcode.trim().is_empty() {
            return Err(PostcodeError::InvalidRecord {
                line,
                reason: "empty postcode".to_string(),
            });
        }

        records.push(Record {
            postcode: postcode.to_string(),
            easting: parse_coordinate(field(mapping.easting), line, "easting")?,
            northing: parse_coordinate(field(mapping.northing), line, "northing")?,
            local_authority_code: parse_code(field(mapping.local_authority_code)),
        });
    }

    Ok(records)
}

/// Empty cell → None; anything else must parse as a float
fn parse_coordinate(raw: &str, line: u64, column: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|e| PostcodeError::InvalidRecord {
            line,
            reason: format!("{} '{}': {}", column, raw, e),
        })
}

fn parse_code(raw: &str) -> Option<String> {
    let raw = raw.trim();
    (!raw.is_empty()).then(|| raw.to_string())
}

/// Find the single `*.zip` extract in a directory
///
/// Errors:
/// - `SourceNotFound` when the directory holds no zip file
/// - `AmbiguousSource` when it holds several
pub fn discover_extract(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(PostcodeError::SourceNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_path = entry.path();

        let is_zip = file_path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("zip"))
            .unwrap_or(false);

        if file_path.is_file() && is_zip {
            found.push(file_path);
        }
    }

    found.sort();
    match found.len() {
        0 => Err(PostcodeError::SourceNotFound {
            path: dir.to_path_buf(),
        }),
        1 => Ok(found.remove(0)),
        _ => Err(PostcodeError::AmbiguousSource {
            path: dir.to_path_buf(),
            candidates: found
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        }),
    }
}
