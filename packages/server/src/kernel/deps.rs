//! Server dependencies for domain actions (using traits for testability)
//!
//! This module provides the central dependency container used by all domain
//! actions. All external services use trait abstractions to enable testing.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use telegram::{InlineButton, TelegramService};

use crate::config::Config;
use crate::domains::classification::EventClassifier;
use crate::kernel::{BaseMessenger, BaseWebFetcher, InlineAction};

// =============================================================================
// TelegramService Adapter (implements BaseMessenger trait)
// =============================================================================

/// Wrapper around TelegramService that implements BaseMessenger trait
pub struct TelegramAdapter(pub Arc<TelegramService>);

impl TelegramAdapter {
    pub fn new(service: Arc<TelegramService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseMessenger for TelegramAdapter {
    async fn send_text(&self, chat_id: i64, text: &str, actions: &[InlineAction]) -> Result<()> {
        let buttons: Vec<InlineButton> = actions
            .iter()
            .map(|a| InlineButton::new(&a.label, &a.callback_data))
            .collect();

        self.0.send_message(chat_id, text, &buttons).await?;
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        filename: &str,
        bytes: Vec<u8>,
        caption: Option<&str>,
    ) -> Result<()> {
        self.0.send_document(chat_id, filename, bytes, caption).await?;
        Ok(())
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Knobs for the scan pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub classifier_timeout: Duration,
    pub classifier_concurrency: usize,
    /// Pause between consecutive sources
    pub source_cooldown: Duration,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            classifier_timeout: Duration::from_secs(config.classifier_timeout_secs),
            classifier_concurrency: config.classifier_concurrency.max(1),
            source_cooldown: Duration::from_millis(config.source_cooldown_ms),
        }
    }
}

/// Server dependencies accessible to domain actions (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: SqlitePool,
    pub fetcher: Arc<dyn BaseWebFetcher>,
    pub classifier: Arc<EventClassifier>,
    pub messenger: Arc<dyn BaseMessenger>,
    pub settings: PipelineSettings,
}

impl ServerDeps {
    pub fn new(
        db_pool: SqlitePool,
        fetcher: Arc<dyn BaseWebFetcher>,
        classifier: Arc<EventClassifier>,
        messenger: Arc<dyn BaseMessenger>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            db_pool,
            fetcher,
            classifier,
            messenger,
            settings,
        }
    }
}
