//! medrag: retrieval-augmented question answering over a prebuilt article index
//!
//! Queries are embedded, matched against a flat FAISS index by exhaustive
//! search, joined with per-chunk source metadata, and turned into a grounded
//! prompt with an explicit source list. The prompt is completed by Gemini.
//!
//! Everything is loaded once at startup into a [`RagContext`]; the startup
//! sequence refuses to serve when the index and metadata disagree in size or
//! the embedding model disagrees with the index in dimension.

pub mod chat;
pub mod config;
pub mod context;
pub mod error;
pub mod generation;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::RagConfig;
pub use context::RagContext;
pub use error::{Error, Result, Stage};
pub use generation::{Answer, AnswerPipeline, PromptBuilder};
pub use retrieval::Retriever;
pub use types::{ChatMessage, RetrievedContext};
