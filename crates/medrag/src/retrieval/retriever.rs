//! Retriever: encoder + index + metadata store

use std::sync::Arc;

use crate::context::RagContext;
use crate::error::Result;
use crate::retrieval::{QueryEncoder, VectorIndex};
use crate::storage::MetadataStore;
use crate::types::RetrievedContext;

/// Ranks metadata records for a query
///
/// Index positions are used directly as metadata positions; no re-sorting is
/// applied on top of the index's own ranking.
#[derive(Clone)]
pub struct Retriever {
    encoder: Arc<QueryEncoder>,
    index: Arc<dyn VectorIndex>,
    metadata: Arc<MetadataStore>,
}

impl Retriever {
    pub fn new(context: &RagContext) -> Self {
        Self {
            encoder: Arc::clone(context.encoder()),
            index: Arc::clone(context.index()),
            metadata: Arc::clone(context.metadata()),
        }
    }

    /// Retrieve up to `k` contexts, ranked `1..=len`
    ///
    /// `k` below 1 is treated as 1; `k` above the index size returns every
    /// record.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedContext>> {
        let vector = self.encoder.encode(query).await?;
        let hits = self.index.search(&vector, k.max(1))?;

        let mut contexts = Vec::with_capacity(hits.len());
        for (position, (id, score)) in hits.iter().enumerate() {
            let record = match self.metadata.get(id) {
                Ok(record) => record,
                Err(e) => {
                    tracing::error!(
                        "Index returned id {} beyond {} metadata records: {}",
                        id,
                        self.metadata.len(),
                        e
                    );
                    return Err(e);
                }
            };

            tracing::debug!("#{} id={} score={:.4} {}", position + 1, id, score, record.title);

            contexts.push(RetrievedContext {
                rank: position + 1,
                score,
                title: record.title.clone(),
                url: record.url.clone(),
                category: record.category.clone(),
                content: record.content.clone(),
            });
        }

        Ok(contexts)
    }
}
