//! Process-wide service context
//!
//! Built once at startup and handed to every component constructor. All
//! members are read-only after construction and safe for concurrent use.

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::providers::{create_embedder, EmbeddingProvider, GeminiClient, LlmProvider};
use crate::retrieval::{FlatIndex, QueryEncoder, VectorIndex};
use crate::storage::MetadataStore;

/// Loaded index, metadata and model collaborators
#[derive(Clone)]
pub struct RagContext {
    config: Arc<RagConfig>,
    metadata: Arc<MetadataStore>,
    index: Arc<dyn VectorIndex>,
    encoder: Arc<QueryEncoder>,
    llm: Arc<dyn LlmProvider>,
}

impl RagContext {
    /// Run the startup sequence against the configured artifacts and models
    ///
    /// Order: credential, index, metadata, count check, encoder self-check.
    /// Any failure aborts startup.
    pub async fn initialize(config: RagConfig) -> Result<Self> {
        config.validate()?;
        config.require_api_key()?;
        let llm: Arc<dyn LlmProvider> = Arc::new(GeminiClient::new(&config.llm)?);
        tracing::info!("Generative model: {}", config.llm.model);

        tracing::info!("Loading vector index: {}", config.artifacts.index_path.display());
        let index = Arc::new(FlatIndex::load(&config.artifacts.index_path)?);

        let metadata = Arc::new(MetadataStore::load(
            &config.artifacts.metadata_path,
            &config.artifacts.metadata_jsonl_path,
        )?);

        let embedder = create_embedder(&config.embeddings).await?;
        tracing::info!("Embedding model: {} via {}", embedder.model(), embedder.name());

        Self::from_parts(config, metadata, index, embedder, llm).await
    }

    /// Assemble a context from already-constructed parts, enforcing the same
    /// invariants as [`RagContext::initialize`]
    pub async fn from_parts(
        config: RagConfig,
        metadata: Arc<MetadataStore>,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        if index.len() != metadata.len() {
            return Err(Error::IndexMetadataMismatch {
                index_size: index.len(),
                metadata_size: metadata.len(),
            });
        }

        let encoder = Arc::new(QueryEncoder::new(embedder));
        encoder.self_check(index.dimension()).await?;

        tracing::info!(
            "RAG context ready: {} chunks, dim {}, top_k {}",
            metadata.len(),
            index.dimension(),
            config.retrieval.top_k
        );

        Ok(Self {
            config: Arc::new(config),
            metadata,
            index,
            encoder,
            llm,
        })
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn metadata(&self) -> &Arc<MetadataStore> {
        &self.metadata
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    pub fn encoder(&self) -> &Arc<QueryEncoder> {
        &self.encoder
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }
}
