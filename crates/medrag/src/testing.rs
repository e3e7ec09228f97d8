//! Test doubles and fixture writers shared by unit tests

use async_trait::async_trait;
use byteorder::{LittleEndian, WriteBytesExt};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::config::RagConfig;
use crate::context::RagContext;
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::retrieval::{FlatIndex, Metric, SearchHits, VectorIndex};
use crate::storage::{MetadataBlob, MetadataSource, MetadataStore};
use crate::types::RawChunkRecord;

/// Deterministic embedder with per-text overrides
pub struct StubEmbedder {
    dimension: usize,
    fixed: HashMap<String, Vec<f32>>,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fixed: HashMap::new(),
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.fixed.insert(text.to_string(), vector);
        self
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(v) = self.fixed.get(text) {
            return Ok(v.clone());
        }
        let seed: usize = text.bytes().map(usize::from).sum();
        Ok((0..self.dimension)
            .map(|i| 1.0 + ((seed + i * 31) % 7) as f32)
            .collect())
    }

    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-embedder"
    }
}

/// Canned LLM that records every prompt it receives
pub struct StubLlm {
    reply: std::result::Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl StubLlm {
    pub fn answering(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for StubLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(Error::llm)
    }

    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-llm"
    }
}

/// Write vectors in the flat FAISS on-disk layout
pub fn write_faiss_flat(path: &Path, metric: Metric, rows: &[Vec<f32>]) {
    let d = rows.first().map(Vec::len).unwrap_or(0);
    let mut out: Vec<u8> = Vec::new();

    let (fourcc, metric_type) = match metric {
        Metric::InnerProduct => (b"IxFI", 0),
        Metric::L2 => (b"IxF2", 1),
    };
    out.write_all(fourcc).unwrap();
    out.write_i32::<LittleEndian>(d as i32).unwrap();
    out.write_i64::<LittleEndian>(rows.len() as i64).unwrap();
    out.write_i64::<LittleEndian>(1 << 20).unwrap();
    out.write_i64::<LittleEndian>(1 << 20).unwrap();
    out.write_u8(1).unwrap();
    out.write_i32::<LittleEndian>(metric_type).unwrap();

    out.write_u64::<LittleEndian>((d * rows.len()) as u64).unwrap();
    for value in rows.iter().flatten() {
        out.write_f32::<LittleEndian>(*value).unwrap();
    }

    std::fs::write(path, out).unwrap();
}

pub fn write_metadata_blob(path: &Path, blob: &MetadataBlob) {
    let bytes = bincode::serde::encode_to_vec(blob, bincode::config::standard()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

pub fn write_metadata_jsonl(path: &Path, lines: &[&str]) {
    std::fs::write(path, lines.join("\n")).unwrap();
}

fn record(title: &str, url: &str, category: &str, content: &str) -> RawChunkRecord {
    RawChunkRecord {
        title: Some(title.to_string()),
        url: Some(url.to_string()),
        category: Some(category.to_string()),
        content: Some(content.to_string()),
    }
}

/// Four-article corpus over 3-dimensional unit vectors
pub fn fixture_records() -> (Vec<RawChunkRecord>, Vec<Vec<f32>>) {
    let records = vec![
        record(
            "Bel Fıtığı",
            "https://medipol.example/bel-fitigi",
            "Medipol Mega",
            "Bel fıtığı, omurlar arasındaki diskin yer değiştirmesidir.",
        ),
        record(
            "Migren",
            "https://medipol.example/migren",
            "Medipol Çamlıca",
            "Migren, tekrarlayan şiddetli baş ağrısı ataklarıyla seyreder.",
        ),
        record(
            "Kütletme",
            "",
            "Medipol Bahçelievler",
            "Parmak kütletme eklem sıvısındaki gaz kabarcıklarından kaynaklanır.",
        ),
        record(
            "Herni",
            "http://x",
            "Medipol Mega",
            "Herni, bir organın bulunduğu boşluğun duvarından taşmasıdır.",
        ),
    ];
    let vectors = vec![
        vec![1.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
        vec![0.6, 0.8, 0.0],
    ];
    (records, vectors)
}

pub fn fixture_embedder() -> StubEmbedder {
    StubEmbedder::new(3)
        .with("bel fıtığı", vec![1.0, 0.0, 0.0])
        .with("migren", vec![0.0, 1.0, 0.0])
        .with("kütletme", vec![0.0, 0.0, 1.0])
}

/// Context over the fixture corpus with a custom LLM
pub async fn fixture_context_with(llm: Arc<dyn LlmProvider>) -> RagContext {
    fixture_context_with_config(RagConfig::default(), llm).await
}

pub async fn fixture_context_with_config(
    config: RagConfig,
    llm: Arc<dyn LlmProvider>,
) -> RagContext {
    let (records, vectors) = fixture_records();
    let index = FlatIndex::from_vectors(Metric::InnerProduct, 3, &vectors).unwrap();
    let metadata = MetadataStore::from_raw(records, MetadataSource::InMemory);

    RagContext::from_parts(
        config,
        Arc::new(metadata),
        Arc::new(index),
        Arc::new(fixture_embedder()),
        llm,
    )
    .await
    .unwrap()
}

pub async fn fixture_context() -> RagContext {
    fixture_context_with(Arc::new(StubLlm::answering("Yanıt."))).await
}

/// Index that reports ids past the metadata it was paired with
pub struct DriftingIndex;

impl VectorIndex for DriftingIndex {
    fn dimension(&self) -> usize {
        3
    }

    fn len(&self) -> usize {
        1
    }

    fn search(&self, _query: &[f32], _k: usize) -> Result<SearchHits> {
        Ok(SearchHits {
            scores: vec![0.9],
            ids: vec![7],
        })
    }
}

/// One metadata record paired with [`DriftingIndex`]
pub async fn drifting_context(llm: Arc<dyn LlmProvider>) -> RagContext {
    let metadata = MetadataStore::from_raw(
        vec![RawChunkRecord {
            content: Some("x".to_string()),
            ..Default::default()
        }],
        MetadataSource::InMemory,
    );

    RagContext::from_parts(
        RagConfig::default(),
        Arc::new(metadata),
        Arc::new(DriftingIndex),
        Arc::new(StubEmbedder::new(3)),
        llm,
    )
    .await
    .unwrap()
}
