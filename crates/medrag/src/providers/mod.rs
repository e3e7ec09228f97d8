//! Provider abstractions for the external models
//!
//! The embedding model and the generative model are opaque collaborators
//! reached through the [`EmbeddingProvider`] and [`LlmProvider`] traits, so
//! backends can be swapped (or stubbed) without touching the pipeline.

pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod ollama;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use embedding::{create_embedder, EmbeddingProvider};
pub use gemini::GeminiClient;
pub use llm::LlmProvider;
pub use ollama::OllamaEmbedder;
#[cfg(feature = "onnx")]
pub use onnx::OnnxEmbedder;
