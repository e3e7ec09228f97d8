//! Core types for the RAG service

pub mod chunk;
pub mod query;
pub mod response;

pub use chunk::{ChunkRecord, RawChunkRecord, UNTITLED};
pub use query::{ChatRequest, QueryRequest, RetrieveRequest};
pub use response::{AnswerResponse, ChatMessage, ChatResponse, RetrieveResponse, RetrievedContext, Role};
