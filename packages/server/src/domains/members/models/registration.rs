use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::common::{EventId, Result, UserId};
use crate::domains::events::Event;

/// There is no rejected state: rejecting deletes the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Approved,
}

/// Registration model - one row per (user, event)
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Registration {
    pub user_id: UserId,
    pub event_id: EventId,
    pub status: RegistrationStatus,
    pub created_at: NaiveDateTime,
}

impl Registration {
    pub async fn find(user_id: UserId, event_id: EventId, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM registrations WHERE user_id = ? AND event_id = ?")
            .bind(user_id)
            .bind(event_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert a pending row. None if the pair is already registered.
    pub async fn create_pending(user_id: UserId, event_id: EventId, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO registrations (user_id, event_id) VALUES (?, ?)
             ON CONFLICT (user_id, event_id) DO NOTHING
             RETURNING *",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// pending -> approved for one pair.
    pub async fn approve(user_id: UserId, event_id: EventId, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE registrations SET status = 'approved'
             WHERE user_id = ? AND event_id = ? AND status = 'pending'
             RETURNING *",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Deletes a pending row. Returns false if none was pending.
    pub async fn reject(user_id: UserId, event_id: EventId, pool: &SqlitePool) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM registrations WHERE user_id = ? AND event_id = ? AND status = 'pending'",
        )
        .bind(user_id)
        .bind(event_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Approve every pending registration for an event in one statement.
    pub async fn approve_all_pending(event_id: EventId, pool: &SqlitePool) -> Result<Vec<UserId>> {
        sqlx::query_scalar(
            "UPDATE registrations SET status = 'approved'
             WHERE event_id = ? AND status = 'pending'
             RETURNING user_id",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Delete every pending registration for an event in one statement.
    pub async fn reject_all_pending(event_id: EventId, pool: &SqlitePool) -> Result<Vec<UserId>> {
        sqlx::query_scalar(
            "DELETE FROM registrations
             WHERE event_id = ? AND status = 'pending'
             RETURNING user_id",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Pending registrations across all events.
    pub async fn count_pending(pool: &SqlitePool) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE status = 'pending'")
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_pending(limit: i64, pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM registrations WHERE status = 'pending'
             ORDER BY created_at ASC, event_id ASC, user_id ASC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Events a user registered for, soonest first. `approved_only` drops
    /// registrations still waiting for a decision.
    pub async fn find_events_for_user(
        user_id: UserId,
        approved_only: bool,
        pool: &SqlitePool,
    ) -> Result<Vec<Event>> {
        let filter = if approved_only {
            "AND r.status = 'approved'"
        } else {
            ""
        };
        sqlx::query_as::<_, Event>(&format!(
            "SELECT e.* FROM events e
             JOIN registrations r ON r.event_id = e.id
             WHERE r.user_id = ? {filter}
             ORDER BY e.event_datetime ASC, e.id ASC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
