use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::common::{Result, SourceId};

/// Source model - SQL persistence layer
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Source {
    pub id: SourceId,
    pub name: String,
    pub url: String,
    /// Relative links on the page resolve against this
    pub base_url: String,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl Source {
    pub async fn find_by_id(id: SourceId, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM sources WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM sources ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_active(pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM sources WHERE active = 1 ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_url(url: &str, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM sources WHERE url = ?")
            .bind(url)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn create(name: &str, url: &str, base_url: &str, pool: &SqlitePool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO sources (name, url, base_url) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(name)
        .bind(url)
        .bind(base_url)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn set_active(id: SourceId, active: bool, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("UPDATE sources SET active = ? WHERE id = ? RETURNING *")
            .bind(active)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Returns true if a row was deleted
    pub async fn delete(id: SourceId, pool: &SqlitePool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sources WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
