use thiserror::Error;

use super::auth::AuthError;

pub type Result<T> = std::result::Result<T, AgentError>;

/// Failures that cross module boundaries.
///
/// Negative-but-expected outcomes (duplicate URL, duplicate registration,
/// unknown id) are enum results on the operations, never errors.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AgentError {
    /// Short reply for the chat channel. Never leaks internals.
    pub fn user_message(&self) -> &'static str {
        match self {
            AgentError::Network(_) => "The source could not be reached. Please try again later.",
            AgentError::Parse(_) => "The input could not be understood.",
            AgentError::Store(_) => "Something went wrong on our side. Please try again later.",
            AgentError::Auth(AuthError::ApproverRequired) => "This action is available to approvers only.",
            AgentError::Auth(AuthError::PermissionDenied(_)) => "Your role does not allow this action.",
            AgentError::Config(_) => "This feature is not configured.",
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AgentError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        AgentError::Store(sqlx::Error::Migrate(Box::new(e)))
    }
}
