//! Core trait for LLM completion clients.
//!
//! The contract is deliberately narrow: one prompt in, one completion
//! string out. Callers own all prompt construction and all parsing of
//! the returned text, including handling output that ignores the
//! prompt's formatting instructions.

use async_trait::async_trait;

/// Error types for LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Client is not available (misconfigured or disabled)
    #[error("LLM unavailable: {0}")]
    Unavailable(String),

    /// Request failed with a non-success status
    #[error("LLM request failed: {0}")]
    RequestFailed(String),

    /// Network error or timeout
    #[error("LLM network error: {0}")]
    Network(String),

    /// Response body did not have the expected shape
    #[error("LLM response parse error: {0}")]
    Parse(String),
}

/// A text-completion client.
///
/// Implementations must be safe to share behind an `Arc` across request
/// handlers and spawned tasks.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Identifier for logging (typically the model name).
    fn id(&self) -> &str;

    /// Generate a completion for a single prompt.
    ///
    /// The returned text is unvalidated: it may contain markdown fences
    /// or malformed JSON even when the prompt forbids them.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
