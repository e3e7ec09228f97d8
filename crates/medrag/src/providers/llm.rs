//! LLM provider trait for answer synthesis

use async_trait::async_trait;

use crate::error::Result;

/// Trait for prompt completion
///
/// Implementations:
/// - `GeminiClient`: Google Gemini API
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a fully built prompt; an empty string when the model returns no text
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
