use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::common::{Result, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Approved,
}

/// User model - SQL persistence layer
///
/// Created on first contact with `pending` status. Only approved accounts
/// may request registrations.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub chat_id: i64,
    pub full_name: String,
    /// Free-text job title; the seniority rank is derived from it
    pub position: String,
    pub account_status: AccountStatus,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn is_approved(&self) -> bool {
        self.account_status == AccountStatus::Approved
    }

    pub async fn find_by_id(id: UserId, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_chat_id(chat_id: i64, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert a pending user unless one exists for `chat_id`.
    ///
    /// Returns the row and whether it was created by this call.
    pub async fn find_or_create(chat_id: i64, full_name: &str, pool: &SqlitePool) -> Result<(Self, bool)> {
        let inserted = sqlx::query_as::<_, Self>(
            "INSERT INTO users (chat_id, full_name) VALUES (?, ?)
             ON CONFLICT (chat_id) DO NOTHING
             RETURNING *",
        )
        .bind(chat_id)
        .bind(full_name)
        .fetch_optional(pool)
        .await?;

        if let Some(user) = inserted {
            return Ok((user, true));
        }

        let existing = sqlx::query_as::<_, Self>("SELECT * FROM users WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_one(pool)
            .await?;
        Ok((existing, false))
    }

    /// Create or promote a user straight to `approved`.
    pub async fn upsert_approved(chat_id: i64, full_name: &str, pool: &SqlitePool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO users (chat_id, full_name, account_status) VALUES (?, ?, 'approved')
             ON CONFLICT (chat_id) DO UPDATE SET account_status = 'approved'
             RETURNING *",
        )
        .bind(chat_id)
        .bind(full_name)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Update name and/or position; None leaves a field unchanged.
    pub async fn update_profile(
        chat_id: i64,
        full_name: Option<&str>,
        position: Option<&str>,
        pool: &SqlitePool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE users
             SET full_name = COALESCE(?, full_name),
                 position = COALESCE(?, position)
             WHERE chat_id = ?
             RETURNING *",
        )
        .bind(full_name)
        .bind(position)
        .bind(chat_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// pending -> approved. None if unknown or already approved.
    pub async fn approve_account(id: UserId, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE users SET account_status = 'approved'
             WHERE id = ? AND account_status = 'pending'
             RETURNING *",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_pending_accounts(pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM users WHERE account_status = 'pending' ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
