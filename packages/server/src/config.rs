use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Model requested when `CLASSIFIER_MODEL` is unset. Matches the client's
/// default OpenAI-compatible endpoint.
pub const DEFAULT_CLASSIFIER_MODEL: &str = "gpt-4o-mini";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub telegram_bot_token: String,
    pub telegram_api_base: Option<String>,
    pub owner_chat_id: Option<i64>,
    pub classifier_api_key: Option<String>,
    pub classifier_base_url: Option<String>,
    pub classifier_model: String,
    pub classifier_timeout_secs: u64,
    pub classifier_concurrency: usize,
    pub fetch_timeout_secs: u64,
    pub source_cooldown_ms: u64,
    /// Overrides the built-in premium organizer list when set
    pub premium_organizers: Option<Vec<String>>,
    /// Overrides the built-in region token list when set
    pub target_region_tokens: Option<Vec<String>>,
    /// Cron expression (with seconds) for periodic scans
    pub scan_schedule: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://media_agent.db?mode=rwc".to_string()),
            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN")
                .context("TELEGRAM_BOT_TOKEN must be set")?,
            telegram_api_base: non_empty_var("TELEGRAM_API_BASE"),
            owner_chat_id: non_empty_var("OWNER_CHAT_ID")
                .map(|v| v.parse())
                .transpose()
                .context("OWNER_CHAT_ID must be a numeric chat id")?,
            classifier_api_key: non_empty_var("CLASSIFIER_API_KEY"),
            classifier_base_url: non_empty_var("CLASSIFIER_BASE_URL"),
            classifier_model: env::var("CLASSIFIER_MODEL").unwrap_or_else(|_| DEFAULT_CLASSIFIER_MODEL.to_string()),
            classifier_timeout_secs: parse_var("CLASSIFIER_TIMEOUT_SECS", 30)?,
            classifier_concurrency: parse_var("CLASSIFIER_CONCURRENCY", 4)?,
            fetch_timeout_secs: parse_var("FETCH_TIMEOUT_SECS", 15)?,
            source_cooldown_ms: parse_var("SOURCE_COOLDOWN_MS", 1000)?,
            premium_organizers: non_empty_var("PREMIUM_ORGANIZERS").map(|v| split_list(&v)),
            target_region_tokens: non_empty_var("TARGET_REGION_TOKENS").map(|v| split_list(&v)),
            scan_schedule: non_empty_var("SCAN_SCHEDULE"),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        None => Ok(default),
    }
}

/// Split a comma-separated list, dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_drops_blanks() {
        assert_eq!(
            split_list(" Сбер , Yandex,, VK "),
            vec!["Сбер".to_string(), "Yandex".to_string(), "VK".to_string()]
        );
    }
}
