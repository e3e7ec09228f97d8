//! Chunk records loaded from the metadata store

use serde::{Deserialize, Serialize};

/// Title substituted when a record has none
pub const UNTITLED: &str = "(Başlık Yok)";

/// A metadata record as stored on disk, every field optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawChunkRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Source category; older exports name this field `hospital`
    #[serde(default, alias = "hospital")]
    pub category: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// One retrievable unit: source text plus its citation metadata
///
/// The record's id is its position in the metadata store, which must match
/// the position of its vector in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRecord {
    pub id: usize,
    pub title: String,
    pub url: String,
    pub category: String,
    pub content: String,
}

impl ChunkRecord {
    /// Fill defaults for missing fields
    ///
    /// Missing title becomes [`UNTITLED`]; missing url, category and content
    /// become empty strings. Empty content is kept as-is.
    pub fn normalize(id: usize, raw: RawChunkRecord) -> Self {
        Self {
            id,
            title: raw.title.unwrap_or_else(|| UNTITLED.to_string()),
            url: raw.url.unwrap_or_default(),
            category: raw.category.unwrap_or_default(),
            content: raw.content.unwrap_or_default(),
        }
    }

    /// Whether the record carries any source text
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_fills_defaults() {
        let record = ChunkRecord::normalize(
            4,
            RawChunkRecord {
                content: Some("Bel fıtığı omurlar arasındaki diskin kaymasıdır.".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(record.id, 4);
        assert_eq!(record.title, UNTITLED);
        assert_eq!(record.url, "");
        assert_eq!(record.category, "");
        assert!(record.has_content());
    }

    #[test]
    fn test_normalize_keeps_empty_content() {
        let record = ChunkRecord::normalize(0, RawChunkRecord::default());
        assert_eq!(record.content, "");
        assert!(!record.has_content());
    }

    #[test]
    fn test_hospital_alias() {
        let raw: RawChunkRecord =
            serde_json::from_str(r#"{"title": "Migren", "hospital": "Medipol Mega"}"#).unwrap();
        assert_eq!(raw.category.as_deref(), Some("Medipol Mega"));
        assert_eq!(raw.url, None);
    }
}
