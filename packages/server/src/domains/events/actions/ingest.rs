//! Deduplication and ingestion gate

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::common::utils::{collapse_whitespace, truncate_chars};
use crate::common::Result;
use crate::domains::classification::{EventAnalysis, Priority};
use crate::domains::events::date_parse::{parse_event_date, DateFallback};
use crate::domains::events::models::{is_http_url, Event, InsertOutcome, NewEvent, Origin};
use crate::kernel::ServerDeps;

const TITLE_MAX_CHARS: usize = 120;

/// Everything the gate needs to store one event.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub analysis: EventAnalysis,
    /// Source text, used when the analysis lacks a title or description
    pub source_text: String,
    /// Stored URL: the candidate link or a sentinel
    pub url: String,
    pub origin: Origin,
}

#[derive(Debug, Clone)]
pub enum IngestOutcome {
    Created(Event),
    Duplicate { url: String },
}

impl IngestOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, IngestOutcome::Duplicate { .. })
    }
}

/// Store an event unless its http(s) URL is already known.
pub async fn ingest_event(
    request: IngestRequest,
    now: NaiveDateTime,
    deps: &ServerDeps,
) -> Result<IngestOutcome> {
    let pool = &deps.db_pool;

    if is_http_url(&request.url) && Event::url_exists(&request.url, pool).await? {
        debug!(url = %request.url, "Known URL, skipping");
        return Ok(IngestOutcome::Duplicate { url: request.url });
    }

    let new = build_new_event(request, now);
    match Event::insert(&new, pool).await? {
        InsertOutcome::Inserted(event) => {
            info!(
                event_id = %event.id,
                origin = ?event.origin,
                status = ?event.status,
                score = event.score,
                "Event ingested"
            );
            Ok(IngestOutcome::Created(event))
        }
        InsertOutcome::DuplicateUrl => Ok(IngestOutcome::Duplicate { url: new.url }),
    }
}

fn build_new_event(request: IngestRequest, now: NaiveDateTime) -> NewEvent {
    let IngestRequest {
        analysis,
        source_text,
        url,
        origin,
    } = request;

    let source_text = collapse_whitespace(&source_text);
    let title = if analysis.title.is_empty() {
        title_from_text(&source_text)
    } else {
        analysis.title.clone()
    };
    let description = if analysis.description.is_empty() {
        source_text.clone()
    } else {
        analysis.description.clone()
    };

    let resolved = parse_event_date(&analysis.date_text, now);
    match resolved.fallback {
        Some(DateFallback::Unparseable) => warn!(
            date_text = %analysis.date_text,
            resolved = %resolved.datetime,
            "Unparseable event date, using now + 1 day"
        ),
        Some(DateFallback::RolledForward { years }) => warn!(
            date_text = %analysis.date_text,
            resolved = %resolved.datetime,
            years,
            "Event date in the past, rolled forward"
        ),
        None => {}
    }

    let priority = if origin == Origin::Partner {
        Priority::High
    } else {
        analysis.priority
    };

    NewEvent {
        title,
        description,
        location: analysis.location.clone(),
        date_text: analysis.date_text.clone(),
        event_datetime: resolved.datetime,
        url,
        score: analysis.score,
        priority,
        required_rank: 1,
        origin,
        analysis,
    }
}

/// First sentence of the text, bounded.
fn title_from_text(text: &str) -> String {
    let first = text
        .split(". ")
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Untitled event");
    truncate_chars(first, TITLE_MAX_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn fallback_analysis_borrows_title_from_text() {
        let new = build_new_event(
            IngestRequest {
                analysis: EventAnalysis::fallback(),
                source_text: "Rust Meetup. 20.05 в Москве".into(),
                url: "https://e.ru/1".into(),
                origin: Origin::Scan,
            },
            now(),
        );

        assert_eq!(new.title, "Rust Meetup");
        assert_eq!(new.description, "Rust Meetup. 20.05 в Москве");
        assert_eq!(new.score, 0);
        assert_eq!(new.priority, Priority::Low);
    }

    #[test]
    fn partner_forces_high_priority() {
        let new = build_new_event(
            IngestRequest {
                analysis: EventAnalysis {
                    title: "Partner day".into(),
                    score: 20,
                    ..EventAnalysis::fallback()
                },
                source_text: String::new(),
                url: "invite".into(),
                origin: Origin::Partner,
            },
            now(),
        );
        assert_eq!(new.priority, Priority::High);
        assert_eq!(new.score, 20);
    }
}
