use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::common::{ApproverRole, Result};

/// Approver model - a chat with a role and a reminder preference
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Approver {
    pub chat_id: i64,
    pub username: String,
    pub role: ApproverRole,
    /// '0'..'6' (Monday = 0), 'every_day' or 'every_month'; None = no reminders
    pub notify_day: Option<String>,
    /// 'HH:MM'
    pub notify_time: Option<String>,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl Approver {
    pub async fn find_by_chat_id(chat_id: i64, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM approvers WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM approvers ORDER BY created_at ASC, chat_id ASC")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Active approvers whose role decides registrations.
    pub async fn find_registration_approvers(pool: &SqlitePool) -> Result<Vec<Self>> {
        let roles: Vec<&str> = ApproverRole::ALL
            .iter()
            .filter(|r| r.approves_registrations())
            .map(|r| r.as_str())
            .collect();
        let placeholders = vec!["?"; roles.len()].join(", ");

        let sql = format!(
            "SELECT * FROM approvers WHERE active = 1 AND role IN ({placeholders})
             ORDER BY created_at ASC, chat_id ASC"
        );
        let mut query = sqlx::query_as::<_, Self>(&sql);
        for role in roles {
            query = query.bind(role);
        }
        query.fetch_all(pool).await.map_err(Into::into)
    }

    /// Active approvers whose reminder falls on this minute.
    pub async fn find_due(
        weekday: u32,
        time: &str,
        first_of_month: bool,
        pool: &SqlitePool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM approvers
             WHERE active = 1
               AND notify_time = ?
               AND (notify_day = ?
                    OR notify_day = 'every_day'
                    OR (? AND notify_day = 'every_month'))
             ORDER BY chat_id ASC",
        )
        .bind(time)
        .bind(weekday.to_string())
        .bind(first_of_month)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Insert, or change the role of an existing approver.
    pub async fn upsert(chat_id: i64, username: &str, role: ApproverRole, pool: &SqlitePool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO approvers (chat_id, username, role) VALUES (?, ?, ?)
             ON CONFLICT (chat_id) DO UPDATE SET role = excluded.role,
                 username = CASE WHEN excluded.username = '' THEN approvers.username ELSE excluded.username END
             RETURNING *",
        )
        .bind(chat_id)
        .bind(username)
        .bind(role)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn set_role(chat_id: i64, role: ApproverRole, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("UPDATE approvers SET role = ? WHERE chat_id = ? RETURNING *")
            .bind(role)
            .bind(chat_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn set_schedule(
        chat_id: i64,
        notify_day: &str,
        notify_time: &str,
        pool: &SqlitePool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE approvers SET notify_day = ?, notify_time = ? WHERE chat_id = ? RETURNING *",
        )
        .bind(notify_day)
        .bind(notify_time)
        .bind(chat_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn set_active(chat_id: i64, active: bool, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("UPDATE approvers SET active = ? WHERE chat_id = ? RETURNING *")
            .bind(active)
            .bind(chat_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn delete(chat_id: i64, pool: &SqlitePool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM approvers WHERE chat_id = ?")
            .bind(chat_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
