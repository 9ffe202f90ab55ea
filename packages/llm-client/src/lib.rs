//! Minimal chat-completions client
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint that accepts
//! the API key as a static bearer token (OpenAI, OpenRouter, local gateways).
//! Providers that need an OAuth token exchange first, such as GigaChat, must
//! sit behind such a gateway. No domain logic lives here: callers build the
//! prompt and interpret the returned text.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_client::{ChatClient, ChatRequest, Message};
//!
//! let client = ChatClient::new(api_key).with_base_url("http://localhost:4000/v1");
//! let response = client
//!     .chat_completion(ChatRequest::new("gpt-4o-mini").message(Message::user("Hello!")))
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{LlmError, Result};
pub use types::*;

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Default endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completions API client.
#[derive(Clone)]
pub struct ChatClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl ChatClient {
    /// Create a new client with the given bearer token.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create a client whose HTTP layer enforces a request timeout.
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Set a custom base URL (proxies, alternative providers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion.
    ///
    /// Returns the content of the first choice.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Chat completion request failed");
                LlmError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Chat completion API error");
            return Err(LlmError::Api(format!("{}: {}", status, error_text)));
        }

        let chat_response: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::Api("No choices in response".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "Chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: chat_response.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = ChatClient::new("token").with_base_url("https://llm.internal/api/v1/");

        assert_eq!(client.api_key, "token");
        assert_eq!(client.base_url(), "https://llm.internal/api/v1");
    }

    #[test]
    fn test_default_base_url() {
        let client = ChatClient::new("token");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        // Bearer-token endpoint; OAuth-exchange providers need a gateway
        assert_eq!(client.base_url(), "https://api.openai.com/v1");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let client = ChatClient::with_timeout("token", Duration::from_millis(500))
            .unwrap()
            .with_base_url("http://127.0.0.1:9");

        let err = client
            .chat_completion(ChatRequest::new("GigaChat").message(Message::user("ping")))
            .await
            .unwrap_err();

        assert!(err.is_transport());
    }
}
