//! Configuration for the RAG service
//!
//! Values come from built-in defaults, an optional TOML file, and finally
//! environment overrides, in that order.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Main RAG service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Prebuilt index and metadata locations
    pub artifacts: ArtifactsConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Generative model configuration
    pub llm: LlmConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Ceiling on in-flight query/chat requests
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7860,
            enable_cors: true,
            max_concurrent_requests: 64,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of contexts passed to the prompt
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

/// Locations of the prebuilt vector index and chunk metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Flat FAISS index file
    pub index_path: PathBuf,
    /// Binary metadata blob (tried first)
    pub metadata_path: PathBuf,
    /// Line-delimited JSON metadata (fallback)
    pub metadata_jsonl_path: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("artifacts/medipol_faiss.index"),
            metadata_path: PathBuf::from("artifacts/medipol_metadata.bin"),
            metadata_jsonl_path: PathBuf::from("artifacts/medipol_metadata.jsonl"),
        }
    }
}

/// Embedding backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Ollama server (`/api/embeddings`)
    #[default]
    Ollama,
    /// Local ONNX model (requires the `onnx` feature)
    Onnx,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Backend used to embed queries
    pub backend: EmbeddingBackend,
    /// Model identifier
    pub model: String,
    /// Ollama base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum sequence length (ONNX)
    pub max_length: usize,
    /// Cache directory for downloaded model files (ONNX)
    pub cache_dir: PathBuf,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Ollama,
            model: "trmteb/turkish-embedding-model".to_string(),
            base_url: "http://localhost:11434".to_string(),
            timeout_secs: 30,
            max_length: 256,
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("medrag")
                .join("models"),
        }
    }
}

/// Generative model (Gemini) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Generation model name
    pub model: String,
    /// API key; required at startup
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Output token cap
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash-exp".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            temperature: 0.3,
            max_output_tokens: 2048,
            timeout_secs: 120,
        }
    }
}

impl RagConfig {
    /// Load configuration: defaults, then the TOML file (if any), then environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Apply overrides from a variable lookup (the process environment in production)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TOP_K") {
            self.retrieval.top_k = parse_var("TOP_K", &v)?;
        }
        // INDEX_PATH and META_PATH win over the older FAISS_PATH and META_PATH_PKL names
        if let Some(v) = lookup("INDEX_PATH").or_else(|| lookup("FAISS_PATH")) {
            self.artifacts.index_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("META_PATH").or_else(|| lookup("META_PATH_PKL")) {
            self.artifacts.metadata_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("META_PATH_JSONL") {
            self.artifacts.metadata_jsonl_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("EMBEDDING_MODEL") {
            self.embeddings.model = v;
        }
        if let Some(v) = lookup("GEMINI_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = lookup("GEMINI_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = parse_var("PORT", &v)?;
        }
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k < 1 {
            return Err(Error::Config("retrieval.top_k must be >= 1".to_string()));
        }
        if self.server.max_concurrent_requests < 1 {
            return Err(Error::Config(
                "server.max_concurrent_requests must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The generative API key, or a fatal error if absent
    pub fn require_api_key(&self) -> Result<&str> {
        match self.llm.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(Error::MissingCredential(
                "Set GEMINI_API_KEY (or llm.api_key in the config file)".to_string(),
            )),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} has an invalid value: {:?}", name, value)))
}
