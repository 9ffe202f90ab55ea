//! Prompt templates for the classifier.

use crate::common::utils::truncate_chars;

const DEFAULT_CRITERIA: &str = "IT, software development, management, AI, data science";

/// Prompt asking for a single JSON object describing one candidate.
pub fn analyze_event_prompt(text: &str, keywords: Option<&[String]>) -> String {
    let criteria = match keywords {
        Some(k) if !k.is_empty() => k.join(", "),
        _ => DEFAULT_CRITERIA.to_string(),
    };

    format!(
        r#"You are an analyst of professional IT events. Extract the facts from the text and rate how important the event is.

EVENT TEXT:
{text}

SEARCH CRITERIA:
[{criteria}]

INSTRUCTIONS:
1. title: use the explicit name, or invent a short clear one.
2. date: format "DD.MM.YYYY HH:MM", or "not specified".
3. location: city and venue; "Online" for online events.
4. score (0-100): relevance to the search criteria. Exact match > 80, IT but indirect 50-79, unrelated < 40.
5. priority: "high" if score >= 80, otherwise "medium" or "low".

Return STRICTLY one JSON object, no markdown:
{{
    "title": "string",
    "description": "string (short summary)",
    "date": "string",
    "location": "string",
    "url": "string (if present in the text)",
    "score": 0,
    "priority": "high/medium/low",
    "target_audience": "string",
    "expected_attendance": "string",
    "key_themes": ["theme1", "theme2"],
    "summary": "string",
    "registration_format": "string",
    "payment_info": "string",
    "conditions": "string"
}}"#,
        text = truncate_chars(text, 2500),
        criteria = criteria,
    )
}

/// Prompt asking for every event found in an uploaded text file.
pub fn extract_drafts_prompt(file_text: &str) -> String {
    format!(
        r#"Find every event in the text below and return a JSON array of objects.
Text: {text}
JSON format: [{{"title": "...", "date": "...", "location": "...", "description": "..."}}]"#,
        text = truncate_chars(file_text, 4000),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_replace_default_criteria() {
        let prompt = analyze_event_prompt("text", Some(&["Rust".to_string(), "WASM".to_string()]));
        assert!(prompt.contains("[Rust, WASM]"));
        assert!(!prompt.contains(DEFAULT_CRITERIA));
    }

    #[test]
    fn long_text_is_truncated() {
        let prompt = analyze_event_prompt(&"x".repeat(5000), None);
        assert!(prompt.len() < 4000);
    }
}
