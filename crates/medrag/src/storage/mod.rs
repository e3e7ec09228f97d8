//! Read-only storage loaded once at startup
//!
//! Provides the chunk metadata store backing citation lookups.

mod metadata;

pub use metadata::{MetadataBlob, MetadataSource, MetadataStore};
