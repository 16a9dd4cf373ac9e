//! Partition Writer
//!
//! Groups records by leading character and writes one compressed partition
//! per group.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::codec::{self, ColumnBatch};
use crate::config::Config;
use crate::error::{PostcodeError, Result};
use crate::schema::Record;

use super::{PartitionManifest, SourceExtract, WrittenFile};

/// Writes partition files from a bulk extract or from parsed records
pub struct PartitionWriter {
    /// Brotli quality
    quality: u32,
    /// Brotli window (log2)
    lgwin: u32,
}

impl PartitionWriter {
    /// Create a writer using the config's compression settings
    pub fn new(config: &Config) -> Self {
        Self {
            quality: config.compression_quality,
            lgwin: config.compression_window,
        }
    }

    /// Partition a bulk extract into `output_dir`
    ///
    /// Steps:
    /// 1. Locate the record table inside the extract
    /// 2. Parse and project every row (fatal on any bad row)
    /// 3. Group by leading character and write each partition
    pub fn write_all(&self, source: &Path, output_dir: &Path) -> Result<PartitionManifest> {
        let mut extract = SourceExtract::open(source)?;
        let records = extract.read_records()?;

        tracing::info!(
            source = %source.display(),
            entry = extract.entry_name(),
            rows = records.len(),
            "Read source extract"
        );

        self.write_records(records, output_dir)
    }

    /// Partition already-parsed records into `output_dir`
    ///
    /// Creates the directory if needed. Existing partition files for the
    /// same keys are overwritten.
    pub fn write_records(&self, records: Vec<Record>, output_dir: &Path) -> Result<PartitionManifest> {
        fs::create_dir_all(output_dir)?;

        let groups = group_by_partition(records)?;
        let mut manifest = PartitionManifest::new();

        for (key, rows) in groups {
            let path = codec::partition_path(output_dir, key);
            let written = self.write_file(&path, &rows)?;

            tracing::info!(
                key = %key,
                rows = written.rows,
                bytes = written.bytes,
                "Wrote partition"
            );

            manifest.insert(key, written);
        }

        tracing::info!(
            partitions = manifest.len(),
            rows = manifest.total_rows(),
            total_bytes = manifest.total_bytes(),
            "Partitioning complete"
        );

        Ok(manifest)
    }

    /// Write the whole extract as one flat table file in the partition format
    pub fn convert(&self, source: &Path, output_file: &Path) -> Result<WrittenFile> {
        let mut extract = SourceExtract::open(source)?;
        let records = extract.read_records()?;

        if let Some(parent) = output_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let written = self.write_file(output_file, &records)?;

        tracing::info!(
            path = %written.path.display(),
            rows = written.rows,
            bytes = written.bytes,
            "Wrote flat table"
        );

        Ok(written)
    }

    /// Encode records and write them to `path`
    fn write_file(&self, path: &Path, records: &[Record]) -> Result<WrittenFile> {
        let batch = ColumnBatch::from_records(records);
        let blob = codec::encode(&batch, self.quality, self.lgwin)?;

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut writer = BufWriter::new(file);
        writer.write_all(&blob)?;
        writer.flush()?;

        let file = writer.into_inner().map_err(|e| {
            PostcodeError::Io(std::io::Error::new(
                e.error().kind(),
                format!("failed to flush {}: {}", path.display(), e.error()),
            ))
        })?;
        file.sync_all()?;

        Ok(WrittenFile {
            path: path.to_path_buf(),
            rows: records.len(),
            bytes: file.metadata()?.len(),
        })
    }
}

impl Default for PartitionWriter {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

/// Group records by partition key, keeping first-seen key order and the
/// source order of rows within each group
///
/// The stored postcode is not modified; only the key is uppercased.
pub fn group_by_partition(records: Vec<Record>) -> Result<IndexMap<char, Vec<Record>>> {
    let mut groups: IndexMap<char, Vec<Record>> = IndexMap::new();

    for (position, record) in records.into_iter().enumerate() {
        let key = record
            .partition_key()
            .ok_or_else(|| PostcodeError::InvalidRecord {
                line: position as u64 + 1,
                reason: "empty postcode".to_string(),
            })?;
        groups.entry(key).or_default().push(record);
    }

    Ok(groups)
}

/// Default flat table path: the input with its extension replaced
/// "extract.zip" → "extract.msgpack.br"
pub fn default_flat_path(input: &Path) -> PathBuf {
    input.with_extension(codec::PARTITION_EXTENSION)
}
