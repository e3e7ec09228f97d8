//! Error types for the RAG service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage that produced a wrapped [`Error::Generation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Query encoding, index search or metadata lookup
    Retrieval,
    /// The external generative model call
    Completion,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Retrieval => f.write_str("retrieval"),
            Stage::Completion => f.write_str("completion"),
        }
    }
}

/// RAG service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required credential is not configured
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Index or metadata file not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Metadata has an unexpected shape or cannot be decoded
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// Vector index file is unreadable or invalid
    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    /// Vector count and metadata record count differ
    #[error("Index/metadata mismatch: index size={index_size}, metadata size={metadata_size}")]
    IndexMetadataMismatch {
        index_size: usize,
        metadata_size: usize,
    },

    /// Query encoder and index disagree on vector dimension
    #[error("Dimension mismatch: query dim={encoder} vs index dim={index}")]
    DimensionMismatch { encoder: usize, index: usize },

    /// Index returned a position with no metadata record
    #[error("Index id {id} out of metadata bounds (len {len})")]
    IndexOutOfBounds { id: usize, len: usize },

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Generative model error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Answer pipeline failure wrapping its cause
    #[error("Answer generation failed during {stage}: {source}")]
    Generation {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Wrap a failure from one stage of the answer pipeline
    pub fn generation(stage: Stage, source: Error) -> Self {
        Self::Generation {
            stage,
            source: Box::new(source),
        }
    }

    /// Stage of a wrapped pipeline failure, if this is one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Generation { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Errors that must abort startup rather than be served around
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::MissingCredential(_)
                | Error::NotFound(_)
                | Error::MalformedData(_)
                | Error::CorruptIndex(_)
                | Error::IndexMetadataMismatch { .. }
                | Error::DimensionMismatch { .. }
        )
    }

    /// Index/metadata disagreement discovered while serving, possibly wrapped
    pub fn is_internal_consistency(&self) -> bool {
        match self {
            Error::IndexOutOfBounds { .. } => true,
            Error::Generation { source, .. } => source.is_internal_consistency(),
            _ => false,
        }
    }

    fn kind(&self) -> (StatusCode, &'static str) {
        match self {
            Error::Config(_) => (StatusCode::BAD_REQUEST, "config_error"),
            Error::MissingCredential(_) => (StatusCode::INTERNAL_SERVER_ERROR, "credential_error"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::MalformedData(_) => (StatusCode::INTERNAL_SERVER_ERROR, "malformed_data"),
            Error::CorruptIndex(_) => (StatusCode::INTERNAL_SERVER_ERROR, "corrupt_index"),
            Error::IndexMetadataMismatch { .. } | Error::DimensionMismatch { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "consistency_error")
            }
            // Internal consistency failures are surfaced generically
            Error::IndexOutOfBounds { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            Error::Embedding(_) => (StatusCode::INTERNAL_SERVER_ERROR, "embedding_error"),
            Error::Llm(_) => (StatusCode::SERVICE_UNAVAILABLE, "llm_error"),
            Error::Generation { stage, source } => match stage {
                Stage::Completion => (StatusCode::BAD_GATEWAY, "generation_error"),
                Stage::Retrieval => (source.kind().0, "retrieval_error"),
            },
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Http(_) => (StatusCode::BAD_GATEWAY, "http_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = if self.is_internal_consistency() {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal consistency error".to_string(),
            )
        } else {
            let (status, error_type) = self.kind();
            (status, error_type, self.to_string())
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
