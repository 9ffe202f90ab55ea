//! Error types for the chat-completions client.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Chat-completions client errors.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response, rate limit, empty choices)
    #[error("API error: {0}")]
    Api(String),

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl LlmError {
    /// Whether the failure happened before the service produced an answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, LlmError::Network(_))
    }
}
