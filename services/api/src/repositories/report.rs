//! Article report repository

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use crate::models::interaction::ReportOutcome;

/// Report repository for database operations
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    /// Create a new report repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// File a report; each user may report an article once
    pub async fn file(&self, article_id: i64, phone: &str, reason: &str) -> Result<ReportOutcome> {
        let live: Option<i64> = sqlx::query_scalar(
            "SELECT article_id FROM articles WHERE article_id = $1 AND status <> 'deleted'",
        )
        .bind(article_id)
        .fetch_optional(&self.pool)
        .await?;
        if live.is_none() {
            return Ok(ReportOutcome::ArticleNotFound);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO article_reports (article_id, phone, reason)
            VALUES ($1, $2, $3)
            ON CONFLICT (article_id, phone) DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(phone)
        .bind(reason)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(ReportOutcome::Duplicate);
        }

        info!("{} reported article {}", phone, article_id);
        Ok(ReportOutcome::Filed)
    }
}
