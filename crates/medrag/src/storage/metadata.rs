//! Chunk metadata store
//!
//! Loads per-chunk source records from either a bincode blob or a
//! line-delimited JSON file. Record position is the chunk id and must line up
//! with vector positions in the index.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{ChunkRecord, RawChunkRecord};

/// Top-level shape of the binary metadata blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MetadataBlob {
    /// A mapping holding the records under `items`
    Items { items: Vec<RawChunkRecord> },
    /// A bare sequence of records
    List(Vec<RawChunkRecord>),
}

impl MetadataBlob {
    fn into_records(self) -> Vec<RawChunkRecord> {
        match self {
            MetadataBlob::Items { items } => items,
            MetadataBlob::List(items) => items,
        }
    }
}

/// Which file the records were loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSource {
    Binary(PathBuf),
    JsonLines(PathBuf),
    InMemory,
}

/// Immutable, position-addressed chunk records
#[derive(Debug)]
pub struct MetadataStore {
    records: Vec<ChunkRecord>,
    source: MetadataSource,
}

impl MetadataStore {
    /// Load records, trying the binary blob first and the JSONL file second
    pub fn load(binary_path: &Path, jsonl_path: &Path) -> Result<Self> {
        let (raw, source) = if binary_path.exists() {
            tracing::info!("Loading metadata: {}", binary_path.display());
            (
                read_binary(binary_path)?,
                MetadataSource::Binary(binary_path.to_path_buf()),
            )
        } else if jsonl_path.exists() {
            tracing::info!(
                "Binary metadata not found at {}, loading {}",
                binary_path.display(),
                jsonl_path.display()
            );
            (
                read_json_lines(jsonl_path)?,
                MetadataSource::JsonLines(jsonl_path.to_path_buf()),
            )
        } else {
            return Err(Error::NotFound(format!(
                "Metadata not found. Put {} or {} in place.",
                binary_path.display(),
                jsonl_path.display()
            )));
        };

        let store = Self::from_raw(raw, source);
        tracing::info!("Loaded {} metadata records", store.len());
        Ok(store)
    }

    /// Normalize raw records into a store
    pub fn from_raw(raw: Vec<RawChunkRecord>, source: MetadataSource) -> Self {
        let records: Vec<ChunkRecord> = raw
            .into_iter()
            .enumerate()
            .map(|(id, r)| ChunkRecord::normalize(id, r))
            .collect();

        let empty = records.iter().filter(|r| !r.has_content()).count();
        if empty > 0 {
            tracing::warn!("{} of {} metadata records have no content", empty, records.len());
        }

        Self { records, source }
    }

    /// Record at an index position
    pub fn get(&self, id: usize) -> Result<&ChunkRecord> {
        self.records.get(id).ok_or(Error::IndexOutOfBounds {
            id,
            len: self.records.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChunkRecord> {
        self.records.iter()
    }

    pub fn source(&self) -> &MetadataSource {
        &self.source
    }
}

fn read_binary(path: &Path) -> Result<Vec<RawChunkRecord>> {
    let bytes = std::fs::read(path).map_err(|e| unreadable(path, e))?;
    let (blob, read): (MetadataBlob, usize) =
        bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).map_err(|e| {
            Error::MalformedData(format!(
                "Unexpected metadata structure in {} (expected a record list or an items mapping): {}",
                path.display(),
                e
            ))
        })?;

    if read != bytes.len() {
        return Err(Error::MalformedData(format!(
            "{} trailing bytes after metadata in {}",
            bytes.len() - read,
            path.display()
        )));
    }

    Ok(blob.into_records())
}

fn read_json_lines(path: &Path) -> Result<Vec<RawChunkRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| unreadable(path, e))?;
    let mut items = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: RawChunkRecord = serde_json::from_str(line).map_err(|e| {
            Error::MalformedData(format!("{} line {}: {}", path.display(), line_no + 1, e))
        })?;
        items.push(record);
    }

    Ok(items)
}

fn unreadable(path: &Path, e: std::io::Error) -> Error {
    Error::MalformedData(format!("Cannot read metadata {}: {}", path.display(), e))
}
