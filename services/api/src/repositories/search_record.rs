//! Search record repository, the durable half of the search history

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::{models::StoredKeyword, search_history::SearchHistoryStore};

/// Search record repository for database operations
#[derive(Clone)]
pub struct SearchRecordRepository {
    pool: PgPool,
}

impl SearchRecordRepository {
    /// Create a new search record repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchHistoryStore for SearchRecordRepository {
    async fn upsert(&self, phone: &str, keyword: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO searchrecords (user_phone, keyword)
            VALUES ($1, $2)
            ON CONFLICT (user_phone, keyword) DO UPDATE
            SET search_count = searchrecords.search_count + 1, updated_at = NOW()
            "#,
        )
        .bind(phone)
        .bind(keyword)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent(&self, phone: &str, limit: usize) -> Result<Vec<StoredKeyword>> {
        let rows = sqlx::query(
            r#"
            SELECT keyword, updated_at
            FROM searchrecords
            WHERE user_phone = $1
            ORDER BY updated_at DESC
            LIMIT $2
            "#,
        )
        .bind(phone)
        .bind(i64::try_from(limit)?)
        .fetch_all(&self.pool)
        .await?;

        let keywords = rows
            .iter()
            .map(|row| {
                Ok(StoredKeyword {
                    keyword: row.try_get("keyword")?,
                    updated_at: row.try_get("updated_at")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(keywords)
    }

    async fn delete_keyword(&self, phone: &str, keyword: &str) -> Result<()> {
        sqlx::query("DELETE FROM searchrecords WHERE user_phone = $1 AND keyword = $2")
            .bind(phone)
            .bind(keyword)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_all(&self, phone: &str) -> Result<()> {
        sqlx::query("DELETE FROM searchrecords WHERE user_phone = $1")
            .bind(phone)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
