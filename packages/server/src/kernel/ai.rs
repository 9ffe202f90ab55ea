//! Classifier backends implementing [`BaseAI`].

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use llm_client::{ChatClient, ChatRequest, Message};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use super::BaseAI;
use crate::config::Config;

/// Chat-completions backend over an OpenAI-compatible bearer-token endpoint.
pub struct ChatCompletionAI {
    client: ChatClient,
    model: String,
}

impl ChatCompletionAI {
    pub fn new(client: ChatClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl BaseAI for ChatCompletionAI {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest::new(&self.model)
            .message(Message::user(prompt))
            .temperature(0.1);

        let response = self.client.chat_completion(request).await?;
        Ok(response.content)
    }
}

/// Stand-in used when no classifier key is configured. Every call fails, so
/// every candidate degrades to the default analysis.
pub struct UnconfiguredAI;

#[async_trait]
impl BaseAI for UnconfiguredAI {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!("classifier API key is not configured"))
    }
}

/// Build the classifier backend from config. Misconfiguration is not fatal.
pub fn create_ai(config: &Config) -> Arc<dyn BaseAI> {
    let Some(api_key) = config.classifier_api_key.clone() else {
        error!("CLASSIFIER_API_KEY is not set: every candidate will receive the default analysis");
        return Arc::new(UnconfiguredAI);
    };

    // The classifier call has its own outer timeout; this one only bounds the socket.
    let http_timeout = Duration::from_secs(config.classifier_timeout_secs.saturating_add(5));
    let client = match ChatClient::with_timeout(api_key, http_timeout) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Classifier client could not be built: every candidate will receive the default analysis");
            return Arc::new(UnconfiguredAI);
        }
    };

    let client = match &config.classifier_base_url {
        Some(url) => client.with_base_url(url),
        None => client,
    };

    Arc::new(ChatCompletionAI::new(client, &config.classifier_model))
}
