//! Thin Telegram Bot API client: text messages with inline buttons and
//! document uploads.

pub mod models;

use reqwest::{multipart, Client};
use thiserror::Error;
use tracing::warn;

pub use crate::models::{ApiResponse, InlineButton, SentMessage};
use crate::models::{InlineKeyboardMarkup, SendMessageBody};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

pub type Result<T> = std::result::Result<T, TelegramError>;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("request to Telegram failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Telegram returned an error ({code}): {description}")]
    Api { code: i64, description: String },

    #[error("Telegram response had no result")]
    EmptyResult,
}

#[derive(Debug, Clone)]
pub struct TelegramOptions {
    pub bot_token: String,
    pub api_base: String,
}

impl TelegramOptions {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelegramService {
    options: TelegramOptions,
    client: Client,
}

impl TelegramService {
    pub fn new(options: TelegramOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.options.api_base.trim_end_matches('/'),
            self.options.bot_token,
            method
        )
    }

    /// Send a text message. Each button becomes its own keyboard row.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[InlineButton],
    ) -> Result<SentMessage> {
        let reply_markup = if buttons.is_empty() {
            None
        } else {
            Some(InlineKeyboardMarkup {
                inline_keyboard: buttons.iter().map(|b| vec![b]).collect(),
            })
        };

        let body = SendMessageBody {
            chat_id,
            text,
            reply_markup,
        };

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?;

        unwrap_response(response.json::<ApiResponse<SentMessage>>().await?)
    }

    /// Upload an in-memory file as a document.
    pub async fn send_document(
        &self,
        chat_id: i64,
        filename: &str,
        bytes: Vec<u8>,
        caption: Option<&str>,
    ) -> Result<SentMessage> {
        let part = multipart::Part::bytes(bytes).file_name(filename.to_string());
        let mut form = multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);
        if let Some(caption) = caption {
            form = form.text("caption", caption.to_string());
        }

        let response = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;

        unwrap_response(response.json::<ApiResponse<SentMessage>>().await?)
    }
}

fn unwrap_response<T>(response: ApiResponse<T>) -> Result<T> {
    if !response.ok {
        let description = response.description.unwrap_or_default();
        let code = response.error_code.unwrap_or_default();
        warn!(code, description = %description, "Telegram API error");
        return Err(TelegramError::Api { code, description });
    }
    response.result.ok_or(TelegramError::EmptyResult)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_url_uses_token_and_trims_base() {
        let service = TelegramService::new(TelegramOptions {
            bot_token: "123:abc".into(),
            api_base: "http://localhost:8081/".into(),
        });
        assert_eq!(
            service.method_url("sendMessage"),
            "http://localhost:8081/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn error_envelope_becomes_api_error() {
        let raw: ApiResponse<SentMessage> = serde_json::from_str(
            r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#,
        )
        .unwrap();

        match unwrap_response(raw) {
            Err(TelegramError::Api { code, description }) => {
                assert_eq!(code, 403);
                assert!(description.contains("blocked"));
            }
            other => panic!("unexpected: {:?}", other.map(|m| m.message_id)),
        }
    }

    #[test]
    fn keyboard_puts_each_button_on_its_own_row() {
        let buttons = vec![
            InlineButton::new("Approve", "reg_ok:3:12"),
            InlineButton::new("Reject", "reg_no:3:12"),
        ];
        let body = SendMessageBody {
            chat_id: 7,
            text: "hi",
            reply_markup: Some(InlineKeyboardMarkup {
                inline_keyboard: buttons.iter().map(|b| vec![b]).collect(),
            }),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["reply_markup"]["inline_keyboard"][1][0]["callback_data"], "reg_no:3:12");
    }
}
