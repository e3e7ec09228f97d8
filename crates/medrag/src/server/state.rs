//! Application state for the RAG server

use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::context::RagContext;
use crate::error::{Error, Result};
use crate::generation::AnswerPipeline;
use crate::retrieval::Retriever;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Loaded index, metadata and model collaborators
    context: RagContext,
    /// Retrieval-only path
    retriever: Retriever,
    /// Full question answering path
    pipeline: AnswerPipeline,
    /// Bounds in-flight model calls
    permits: Semaphore,
}

impl AppState {
    /// Wrap an initialized context
    pub fn new(context: RagContext) -> Self {
        let max = context.config().server.max_concurrent_requests;
        tracing::info!("Accepting up to {} concurrent requests", max);

        Self {
            inner: Arc::new(AppStateInner {
                retriever: Retriever::new(&context),
                pipeline: AnswerPipeline::new(&context),
                permits: Semaphore::new(max),
                context,
            }),
        }
    }

    pub fn context(&self) -> &RagContext {
        &self.inner.context
    }

    pub fn retriever(&self) -> &Retriever {
        &self.inner.retriever
    }

    pub fn pipeline(&self) -> &AnswerPipeline {
        &self.inner.pipeline
    }

    /// Wait for a request slot
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        self.inner
            .permits
            .acquire()
            .await
            .map_err(|e| Error::internal(format!("Request limiter closed: {}", e)))
    }

    /// Free request slots
    pub fn available_permits(&self) -> usize {
        self.inner.permits.available_permits()
    }
}
