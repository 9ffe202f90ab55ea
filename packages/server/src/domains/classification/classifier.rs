use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::prompts::{analyze_event_prompt, extract_drafts_prompt};
use super::rules::{RuleHit, ScoringRules};
use super::schema::{EventAnalysis, EventDraft};
use crate::kernel::BaseAI;

/// Outcome of classifying one candidate.
#[derive(Debug, Clone)]
pub struct Classified {
    pub analysis: EventAnalysis,
    pub rule_hits: Vec<RuleHit>,
    /// Why the default analysis was used, if it was
    pub fallback_reason: Option<String>,
}

impl Classified {
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Calls the external classifier and post-processes its answer.
///
/// Never fails: any problem with the call or the answer yields
/// [`EventAnalysis::fallback`], returned as-is without the rules layer.
pub struct EventClassifier {
    ai: Arc<dyn BaseAI>,
    rules: ScoringRules,
    timeout: Duration,
    concurrency: usize,
}

impl EventClassifier {
    pub fn new(ai: Arc<dyn BaseAI>, rules: ScoringRules, timeout: Duration, concurrency: usize) -> Self {
        Self {
            ai,
            rules,
            timeout,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn classify(&self, text: &str, keywords: Option<&[String]>) -> Classified {
        let prompt = analyze_event_prompt(text, keywords);

        let raw = match tokio::time::timeout(self.timeout, self.ai.complete(&prompt)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return self.fallback(format!("classifier call failed: {}", e)),
            Err(_) => {
                return self.fallback(format!(
                    "classifier timed out after {}ms",
                    self.timeout.as_millis()
                ))
            }
        };

        let mut analysis = match EventAnalysis::parse(&raw) {
            Ok(analysis) => analysis,
            Err(e) => return self.fallback(format!("malformed classifier answer: {}", e)),
        };

        let model_score = analysis.score;
        let rule_hits = self.rules.apply(text, &mut analysis);
        debug!(
            model_score,
            final_score = analysis.score,
            priority = %analysis.priority,
            rules = rule_hits.len(),
            "Candidate classified"
        );

        Classified {
            analysis,
            rule_hits,
            fallback_reason: None,
        }
    }

    /// Classify many texts with at most `concurrency` calls in flight.
    /// Output order matches input order.
    pub async fn classify_all(&self, texts: Vec<String>, keywords: Option<&[String]>) -> Vec<Classified> {
        stream::iter(texts)
            .map(|text| async move { self.classify(&text, keywords).await })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Batch mode: ask for every event in a text file. Failures yield an empty list.
    pub async fn extract_drafts(&self, file_text: &str) -> Vec<EventDraft> {
        let prompt = extract_drafts_prompt(file_text);

        let raw = match tokio::time::timeout(self.timeout, self.ai.complete(&prompt)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!(error = %e, "Batch extraction call failed");
                return Vec::new();
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis(), "Batch extraction timed out");
                return Vec::new();
            }
        };

        match EventDraft::parse_list(&raw) {
            Ok(drafts) => drafts,
            Err(e) => {
                warn!(error = %e, "Malformed batch extraction answer");
                Vec::new()
            }
        }
    }

    fn fallback(&self, reason: String) -> Classified {
        warn!(reason = %reason, "Using default analysis");
        Classified {
            analysis: EventAnalysis::fallback(),
            rule_hits: Vec::new(),
            fallback_reason: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::classification::Priority;
    use crate::kernel::test_dependencies::MockAI;

    fn classifier(ai: MockAI, timeout: Duration) -> EventClassifier {
        EventClassifier::new(Arc::new(ai), ScoringRules::new::<&str>(&[], &[]), timeout, 2)
    }

    #[tokio::test]
    async fn applies_rules_to_model_score() {
        let ai = MockAI::new().with_response(r#"{"title": "AI Day", "score": 70, "priority": "medium"}"#);
        let result = classifier(ai, Duration::from_secs(5))
            .classify("AI Day for engineers", None)
            .await;

        assert!(!result.is_fallback());
        assert_eq!(result.analysis.score, 85);
        assert_eq!(result.analysis.priority, Priority::High);
    }

    #[tokio::test]
    async fn malformed_answer_falls_back_without_rules() {
        let ai = MockAI::new().with_response("Sorry, I cannot help with that.");
        let result = classifier(ai, Duration::from_secs(5))
            .classify("AI conference 1000+ attendees", None)
            .await;

        assert!(result.is_fallback());
        assert_eq!(result.analysis, EventAnalysis::fallback());
    }

    #[tokio::test]
    async fn failing_backend_falls_back() {
        let ai = MockAI::new().failing();
        let result = classifier(ai, Duration::from_secs(5)).classify("text", None).await;

        assert!(result.is_fallback());
        assert_eq!(result.analysis.score, 0);
        assert_eq!(result.analysis.priority, Priority::Low);
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let ai = MockAI::new()
            .with_delay(Duration::from_secs(2))
            .with_response(r#"{"score": 90}"#);
        let result = classifier(ai, Duration::from_millis(50)).classify("text", None).await;

        assert!(result.is_fallback());
        assert!(result.fallback_reason.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn classify_all_keeps_input_order() {
        let ai = MockAI::new()
            .with_response(r#"{"title": "first", "score": 10}"#)
            .with_response(r#"{"title": "second", "score": 20}"#)
            .with_response(r#"{"title": "third", "score": 30}"#);
        let results = classifier(ai, Duration::from_secs(5))
            .classify_all(vec!["a".into(), "b".into(), "c".into()], None)
            .await;

        let titles: Vec<&str> = results.iter().map(|r| r.analysis.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn extract_drafts_parses_array() {
        let ai = MockAI::new().with_response(
            r#"```json
[{"title": "DevOps Meetup", "date": "10.06.2026"}, {"title": "QA Day"}]
```"#,
        );
        let drafts = classifier(ai, Duration::from_secs(5)).extract_drafts("file").await;
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[1].title, "QA Day");
    }
}
