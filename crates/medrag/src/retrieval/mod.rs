//! Query encoding, vector search and context assembly

pub mod encoder;
pub mod index;
pub mod retriever;

pub use encoder::QueryEncoder;
pub use index::{FlatIndex, Metric, SearchHits, VectorIndex};
pub use retriever::Retriever;
