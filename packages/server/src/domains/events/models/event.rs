use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::common::{EventId, Result};
use crate::domains::classification::{EventAnalysis, Priority};
use crate::kernel::database::is_unique_violation;

/// Placeholder URLs that never take part in duplicate detection.
pub const NO_URL: &str = "no_url";
pub const FILE_UPLOAD_URL: &str = "file_upload";
pub const INVITE_URL: &str = "invite";

pub fn is_http_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

pub fn is_sentinel_url(url: &str) -> bool {
    matches!(url, NO_URL | FILE_UPLOAD_URL | INVITE_URL)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EventStatus {
    /// Scanned or imported, never shown to a moderator
    New,
    /// Shown to a moderator at least once, undecided
    Pending,
    Approved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Origin {
    Scan,
    Partner,
    File,
    Manual,
}

impl Origin {
    /// Partner and manual events skip moderation.
    pub fn initial_status(&self) -> EventStatus {
        match self {
            Origin::Scan | Origin::File => EventStatus::New,
            Origin::Partner | Origin::Manual => EventStatus::Approved,
        }
    }
}

/// Event model - SQL persistence layer
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub date_text: String,
    /// Derived from `date_text`; None only for rows written before parsing
    pub event_datetime: Option<NaiveDateTime>,
    pub url: String,
    pub analysis: Json<EventAnalysis>,
    pub score: u8,
    pub priority: Priority,
    pub required_rank: u8,
    pub status: EventStatus,
    pub origin: Origin,
    pub created_at: NaiveDateTime,
}

/// Values for a new row. Status is derived from origin.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub date_text: String,
    pub event_datetime: NaiveDateTime,
    pub url: String,
    pub analysis: EventAnalysis,
    pub score: u8,
    pub priority: Priority,
    pub required_rank: u8,
    pub origin: Origin,
}

#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Inserted(Event),
    DuplicateUrl,
}

/// Editable event fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventField {
    Title,
    Description,
    Location,
    Date,
    Url,
}

impl EventField {
    fn column(&self) -> &'static str {
        match self {
            EventField::Title => "title",
            EventField::Description => "description",
            EventField::Location => "location",
            EventField::Date => "date_text",
            EventField::Url => "url",
        }
    }
}

/// Counters for the stats screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventStats {
    pub total: i64,
    pub new: i64,
    pub pending: i64,
    pub approved: i64,
    pub from_scan: i64,
    pub from_partner: i64,
    pub from_file: i64,
    pub from_manual: i64,
    pub high_priority: i64,
    pub average_approved_score: Option<f64>,
}

const QUEUE_FILTER: &str = "status IN ('new', 'pending')";

const CATALOGUE_ORDER: &str = "CASE priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END, score DESC, created_at DESC, id DESC";

impl Event {
    pub async fn find_by_id(id: EventId, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn url_exists(url: &str, pool: &SqlitePool) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM events WHERE url = ? LIMIT 1")
            .bind(url)
            .fetch_optional(pool)
            .await?;
        Ok(found.is_some())
    }

    /// Insert; a clash on the http(s) url index is reported, not raised.
    pub async fn insert(new: &NewEvent, pool: &SqlitePool) -> Result<InsertOutcome> {
        let result = sqlx::query_as::<_, Self>(
            "INSERT INTO events (
                title, description, location, date_text, event_datetime, url,
                analysis, score, priority, required_rank, status, origin
             )
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.location)
        .bind(&new.date_text)
        .bind(new.event_datetime)
        .bind(&new.url)
        .bind(Json(&new.analysis))
        .bind(new.score)
        .bind(new.priority)
        .bind(new.required_rank)
        .bind(new.origin.initial_status())
        .bind(new.origin)
        .fetch_one(pool)
        .await;

        match result {
            Ok(event) => Ok(InsertOutcome::Inserted(event)),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::DuplicateUrl),
            Err(e) => Err(e.into()),
        }
    }

    /// The `page`-th queued event, oldest first.
    pub async fn find_queued_at(page: i64, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT * FROM events WHERE {QUEUE_FILTER} ORDER BY created_at ASC, id ASC LIMIT 1 OFFSET ?"
        ))
        .bind(page.max(0))
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn count_queued(pool: &SqlitePool) -> Result<i64> {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM events WHERE {QUEUE_FILTER}"))
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    /// new -> pending; no-op for any other status
    pub async fn mark_presented(id: EventId, pool: &SqlitePool) -> Result<bool> {
        let result = sqlx::query("UPDATE events SET status = 'pending' WHERE id = ? AND status = 'new'")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// new|pending -> approved. None if the event is gone or already approved.
    pub async fn approve(id: EventId, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE events SET status = 'approved' WHERE id = ? AND {QUEUE_FILTER} RETURNING *"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Deletes a queued event. Returns false if nothing was queued under `id`.
    pub async fn reject(id: EventId, pool: &SqlitePool) -> Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM events WHERE id = ? AND {QUEUE_FILTER}"))
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update one text field; the date also refreshes `event_datetime`.
    pub async fn update_field(
        id: EventId,
        field: &EventField,
        value: &str,
        event_datetime: Option<NaiveDateTime>,
        pool: &SqlitePool,
    ) -> std::result::Result<Option<Self>, sqlx::Error> {
        let sql = match field {
            EventField::Date => {
                "UPDATE events SET date_text = ?, event_datetime = COALESCE(?, event_datetime) WHERE id = ? RETURNING *".to_string()
            }
            other => format!("UPDATE events SET {} = ? WHERE id = ? RETURNING *", other.column()),
        };

        let mut query = sqlx::query_as::<_, Self>(&sql).bind(value);
        if *field == EventField::Date {
            query = query.bind(event_datetime);
        }
        query.bind(id).fetch_optional(pool).await
    }

    pub async fn set_required_rank(id: EventId, rank: u8, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("UPDATE events SET required_rank = ? WHERE id = ? RETURNING *")
            .bind(rank)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Approved events: priority band, then score, then newest.
    pub async fn find_approved_paginated(page: i64, limit: i64, pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT * FROM events WHERE status = 'approved' ORDER BY {CATALOGUE_ORDER} LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(page.max(0) * limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn count_approved(pool: &SqlitePool) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE status = 'approved'")
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_high_priority(limit: i64, pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM events WHERE status = 'approved' AND priority = 'high'
             ORDER BY score DESC, created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_origin(origin: Origin, pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT * FROM events WHERE origin = ? ORDER BY {CATALOGUE_ORDER}"
        ))
        .bind(origin)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Approved events whose title, description or analysis contains any keyword.
    ///
    /// SQLite's `lower()` and `LIKE` fold ASCII only, so the match runs here
    /// with Unicode lowercasing over the catalogue order.
    pub async fn search(keywords: &[String], limit: i64, pool: &SqlitePool) -> Result<Vec<Self>> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let approved = sqlx::query_as::<_, Self>(&format!(
            "SELECT * FROM events WHERE status = 'approved' ORDER BY {CATALOGUE_ORDER}"
        ))
        .fetch_all(pool)
        .await?;

        Ok(approved
            .into_iter()
            .filter(|event| event.matches_any(&keywords))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    /// `keywords` must already be lowercase.
    fn matches_any(&self, keywords: &[String]) -> bool {
        let haystack = format!(
            "{}\n{}\n{}",
            self.title,
            self.description,
            self.analysis.search_text()
        )
        .to_lowercase();
        keywords.iter().any(|k| haystack.contains(k.as_str()))
    }

    pub async fn stats(pool: &SqlitePool) -> Result<EventStats> {
        let row: (i64, i64, i64, i64, i64, i64, i64, i64, i64, Option<f64>) = sqlx::query_as(
            "SELECT
                COUNT(*),
                COALESCE(SUM(status = 'new'), 0),
                COALESCE(SUM(status = 'pending'), 0),
                COALESCE(SUM(status = 'approved'), 0),
                COALESCE(SUM(origin = 'scan'), 0),
                COALESCE(SUM(origin = 'partner'), 0),
                COALESCE(SUM(origin = 'file'), 0),
                COALESCE(SUM(origin = 'manual'), 0),
                COALESCE(SUM(priority = 'high'), 0),
                AVG(CASE WHEN status = 'approved' THEN score END)
             FROM events",
        )
        .fetch_one(pool)
        .await?;

        Ok(EventStats {
            total: row.0,
            new: row.1,
            pending: row.2,
            approved: row.3,
            from_scan: row.4,
            from_partner: row.5,
            from_file: row.6,
            from_manual: row.7,
            high_priority: row.8,
            average_approved_score: row.9,
        })
    }
}
