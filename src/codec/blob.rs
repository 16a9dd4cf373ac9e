//! Partition blobs
//!
//! MessagePack serialization of a `ColumnBatch` followed by a single brotli
//! pass over the whole payload.

use std::io::{Read, Write};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{PostcodeError, Result};

use super::{ColumnBatch, Value};

/// Brotli internal buffer size
const BROTLI_BUFFER_SIZE: usize = 4096;

/// Borrowed view used for encoding (avoids cloning the batch)
#[derive(Serialize)]
struct PayloadRef<'a> {
    columns: &'a [String],
    data: &'a IndexMap<String, Vec<Value>>,
}

/// Owned payload produced by decoding
#[derive(Deserialize)]
struct Payload {
    columns: Vec<String>,
    data: IndexMap<String, Vec<Value>>,
}

/// Encode a batch into a compressed partition blob
///
/// Format: brotli(msgpack {"columns": [...], "data": {...}})
pub fn encode(batch: &ColumnBatch, quality: u32, lgwin: u32) -> Result<Vec<u8>> {
    let payload = PayloadRef {
        columns: &batch.columns,
        data: &batch.data,
    };

    // Named encoding writes the struct as a map keyed by field name
    let packed = rmp_serde::to_vec_named(&payload)
        .map_err(|e| PostcodeError::Serialization(format!("msgpack encode failed: {}", e)))?;

    compress(&packed, quality, lgwin)
}

/// Decode a compressed partition blob back into a batch
///
/// Returns `CorruptPartition` when decompression or decoding fails, or when
/// the decoded structure is not a well-formed batch.
pub fn decode(bytes: &[u8]) -> Result<ColumnBatch> {
    let packed = decompress(bytes)?;

    let payload: Payload = rmp_serde::from_slice(&packed)
        .map_err(|e| PostcodeError::corrupt(format!("msgpack decode failed: {}", e)))?;

    ColumnBatch::from_parts(payload.columns, payload.data)
}

/// Brotli-compress a buffer
pub fn compress(bytes: &[u8], quality: u32, lgwin: u32) -> Result<Vec<u8>> {
    let mut writer =
        brotli::CompressorWriter::new(Vec::new(), BROTLI_BUFFER_SIZE, quality, lgwin);
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(writer.into_inner())
}

/// Brotli-decompress a buffer
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut reader = brotli::Decompressor::new(bytes, BROTLI_BUFFER_SIZE);
    let mut out = Vec::new();
    reader
        .read_to_end(&mut out)
        .map_err(|e| PostcodeError::corrupt(format!("brotli decompression failed: {}", e)))?;
    Ok(out)
}
