//! Shape of the classifier's JSON answer.
//!
//! Every field has an explicit default except `score`: an answer without a
//! usable score is treated as a failed classification.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Event priority band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Default, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// ≥80 high, ≥50 medium, else low.
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Priority::High,
            50..=79 => Priority::Medium,
            _ => Priority::Low,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }
}

/// Structured analysis of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAnalysis {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,

    /// Free-text date as the model wrote it
    #[serde(default, rename = "date", deserialize_with = "lenient_string")]
    pub date_text: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,

    #[serde(deserialize_with = "required_score")]
    pub score: u8,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default, deserialize_with = "lenient_string")]
    pub target_audience: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub expected_attendance: String,

    #[serde(default, deserialize_with = "lenient_list")]
    pub key_themes: Vec<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub registration_format: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub payment_info: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub conditions: String,
}

impl EventAnalysis {
    /// Free-text values joined for keyword search. Keys and numbers are left out.
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = vec![
            self.title.as_str(),
            self.description.as_str(),
            self.location.as_str(),
            self.target_audience.as_str(),
            self.summary.as_str(),
            self.registration_format.as_str(),
            self.payment_info.as_str(),
            self.conditions.as_str(),
        ];
        parts.extend(self.key_themes.iter().map(String::as_str));
        parts.join("\n")
    }

    /// The fixed answer used whenever classification fails.
    pub fn fallback() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            date_text: String::new(),
            location: String::new(),
            url: String::new(),
            score: 0,
            priority: Priority::Low,
            target_audience: String::new(),
            expected_attendance: String::new(),
            key_themes: Vec::new(),
            summary: String::new(),
            registration_format: String::new(),
            payment_info: String::new(),
            conditions: String::new(),
        }
    }

    /// Parse a model answer, tolerating markdown code fences around it.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(strip_code_fences(raw))
    }
}

/// One event found in an uploaded file, before classification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventDraft {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,

    #[serde(default, rename = "date", deserialize_with = "lenient_string")]
    pub date_text: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
}

impl EventDraft {
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(strip_code_fences(raw))
    }

    /// Text handed to the classifier for this draft.
    pub fn as_candidate_text(&self) -> String {
        [&self.title, &self.date_text, &self.location, &self.description]
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim())
            .collect::<Vec<_>>()
            .join(". ")
    }
}

/// Strip a surrounding ```json ... ``` fence if present.
pub fn strip_code_fences(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    })
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Null | Value::String(_) => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        _ => Vec::new(),
    })
}

/// Accepts 73, 73.6 or "73"; clamps into 0..=100. Anything else is an error.
fn required_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => Ok(n.round().clamp(0.0, 100.0) as u8),
        _ => Err(serde::de::Error::custom(format!(
            "score must be a number, got {}",
            value
        ))),
    }
}
