// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BaseAI, BaseMessenger, BaseWebFetcher, InlineAction, PipelineSettings, ServerDeps};
use crate::domains::classification::{EventClassifier, ScoringRules};

// =============================================================================
// Mock Web Fetcher
// =============================================================================

pub struct MockWebFetcher {
    pages: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockWebFetcher {
    pub fn new() -> Self {
        Self {
            pages: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Serve `html` for `url`. Unknown URLs fail like an unreachable host.
    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), html.to_string());
        self
    }

    /// Get all URLs that were fetched
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockWebFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseWebFetcher for MockWebFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("connection refused: {}", url))
    }
}

// =============================================================================
// Mock AI (Generic LLM capabilities)
// =============================================================================

pub struct MockAI {
    responses: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
    fail: bool,
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            fail: false,
        }
    }

    /// Add a text response to the queue. When the queue is empty the mock
    /// answers with a neutral score of 50.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(response.into());
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every call returns an error
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Get all prompts that were sent to the AI
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAI for MockAI {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(anyhow!("mock classifier unavailable"));
        }

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(r#"{"title": "Mock event", "score": 50, "priority": "medium"}"#.to_string())
        } else {
            Ok(responses.remove(0))
        }
    }
}

// =============================================================================
// Spy Messenger
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentText {
    pub chat_id: i64,
    pub text: String,
    pub actions: Vec<InlineAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentDocument {
    pub chat_id: i64,
    pub filename: String,
    pub bytes: Vec<u8>,
    pub caption: Option<String>,
}

impl SentDocument {
    pub fn body(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

pub struct SpyMessenger {
    texts: Arc<Mutex<Vec<SentText>>>,
    documents: Arc<Mutex<Vec<SentDocument>>>,
    failing_chats: Arc<Mutex<HashSet<i64>>>,
}

impl SpyMessenger {
    pub fn new() -> Self {
        Self {
            texts: Arc::new(Mutex::new(Vec::new())),
            documents: Arc::new(Mutex::new(Vec::new())),
            failing_chats: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Deliveries to `chat_id` fail (e.g., the user blocked the bot)
    pub fn failing_for(self, chat_id: i64) -> Self {
        self.failing_chats.lock().unwrap().insert(chat_id);
        self
    }

    pub fn texts(&self) -> Vec<SentText> {
        self.texts.lock().unwrap().clone()
    }

    pub fn texts_to(&self, chat_id: i64) -> Vec<SentText> {
        self.texts()
            .into_iter()
            .filter(|t| t.chat_id == chat_id)
            .collect()
    }

    pub fn documents(&self) -> Vec<SentDocument> {
        self.documents.lock().unwrap().clone()
    }

    pub fn documents_to(&self, chat_id: i64) -> Vec<SentDocument> {
        self.documents()
            .into_iter()
            .filter(|d| d.chat_id == chat_id)
            .collect()
    }

    fn check_deliverable(&self, chat_id: i64) -> Result<()> {
        if self.failing_chats.lock().unwrap().contains(&chat_id) {
            return Err(anyhow!("Forbidden: bot was blocked by the user {}", chat_id));
        }
        Ok(())
    }
}

impl Default for SpyMessenger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseMessenger for SpyMessenger {
    async fn send_text(&self, chat_id: i64, text: &str, actions: &[InlineAction]) -> Result<()> {
        self.check_deliverable(chat_id)?;
        self.texts.lock().unwrap().push(SentText {
            chat_id,
            text: text.to_string(),
            actions: actions.to_vec(),
        });
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        filename: &str,
        bytes: Vec<u8>,
        caption: Option<&str>,
    ) -> Result<()> {
        self.check_deliverable(chat_id)?;
        self.documents.lock().unwrap().push(SentDocument {
            chat_id,
            filename: filename.to_string(),
            bytes,
            caption: caption.map(str::to_string),
        });
        Ok(())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Mock services bundled for building a `ServerDeps` in tests.
pub struct TestDependencies {
    pub fetcher: Arc<MockWebFetcher>,
    pub ai: Arc<MockAI>,
    pub messenger: Arc<SpyMessenger>,
    pub rules: ScoringRules,
    pub settings: PipelineSettings,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            fetcher: Arc::new(MockWebFetcher::new()),
            ai: Arc::new(MockAI::new()),
            messenger: Arc::new(SpyMessenger::new()),
            rules: ScoringRules::new::<&str>(&[], &[]),
            settings: PipelineSettings {
                classifier_timeout: Duration::from_secs(5),
                classifier_concurrency: 2,
                source_cooldown: Duration::ZERO,
            },
        }
    }

    pub fn mock_fetcher(mut self, fetcher: MockWebFetcher) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    pub fn mock_ai(mut self, ai: MockAI) -> Self {
        self.ai = Arc::new(ai);
        self
    }

    pub fn spy_messenger(mut self, messenger: SpyMessenger) -> Self {
        self.messenger = Arc::new(messenger);
        self
    }

    pub fn classifier_timeout(mut self, timeout: Duration) -> Self {
        self.settings.classifier_timeout = timeout;
        self
    }

    pub fn rules(mut self, rules: ScoringRules) -> Self {
        self.rules = rules;
        self
    }

    /// Wire the mocks into a `ServerDeps` over `pool`. The mocks stay
    /// reachable through `self` for assertions.
    pub fn server_deps(&self, pool: SqlitePool) -> ServerDeps {
        let classifier = EventClassifier::new(
            self.ai.clone(),
            self.rules.clone(),
            self.settings.classifier_timeout,
            self.settings.classifier_concurrency,
        );

        ServerDeps::new(
            pool,
            self.fetcher.clone(),
            Arc::new(classifier),
            self.messenger.clone(),
            self.settings,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
