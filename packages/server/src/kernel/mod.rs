//! Kernel module - infrastructure and dependencies.

pub mod ai;
pub mod database;
pub mod deps;
pub mod http_fetcher;
pub mod intents;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use ai::{create_ai, ChatCompletionAI, UnconfiguredAI};
pub use deps::{PipelineSettings, ServerDeps, TelegramAdapter};
pub use http_fetcher::HttpFetcher;
pub use intents::{dispatch, resolve_actor, Intent, Reply};
pub use test_dependencies::TestDependencies;
pub use traits::*;
