// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Domain code (extract candidates, classify, notify approvers) uses them.
//
// Naming convention: Base* for trait names (e.g., BaseAI, BaseMessenger)

use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// Web Fetcher Trait (Infrastructure - source pages)
// =============================================================================

#[async_trait]
pub trait BaseWebFetcher: Send + Sync {
    /// Fetch a page and return its HTML body. Non-2xx is an error.
    async fn fetch_html(&self, url: &str) -> Result<String>;
}

// =============================================================================
// AI Trait (Infrastructure - Generic LLM capabilities)
// =============================================================================

#[async_trait]
pub trait BaseAI: Send + Sync {
    /// Complete a prompt with an LLM (returns raw text response)
    async fn complete(&self, prompt: &str) -> Result<String>;
}

// =============================================================================
// Messenger Trait (Infrastructure - outbound chat channel)
// =============================================================================

/// Inline button attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAction {
    pub label: String,
    pub callback_data: String,
}

impl InlineAction {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

#[async_trait]
pub trait BaseMessenger: Send + Sync {
    /// Send text to a chat, optionally with inline actions
    async fn send_text(&self, chat_id: i64, text: &str, actions: &[InlineAction]) -> Result<()>;

    /// Send an in-memory file to a chat
    async fn send_document(
        &self,
        chat_id: i64,
        filename: &str,
        bytes: Vec<u8>,
        caption: Option<&str>,
    ) -> Result<()>;
}
