//! Interaction repository: like/favorite rows and their article counters

use anyhow::Result;
use sqlx::{PgExecutor, PgPool, Row};
use tracing::info;

use crate::{
    interaction::{
        CounterDelta, InteractionAction, InteractionError, InteractionFlags, InteractionKind,
        RowMutation, ToggleOutcome, plan_toggle,
    },
    models::InteractionStatus,
};

/// Interaction repository for database operations
#[derive(Clone)]
pub struct InteractionRepository {
    pool: PgPool,
}

async fn load_flags<'e>(
    executor: impl PgExecutor<'e>,
    article_id: i64,
    phone: &str,
) -> Result<Option<InteractionFlags>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT is_like, is_collect, my_comment <> '' AS has_comment
        FROM userarticles
        WHERE article_id = $1 AND phone = $2
        "#,
    )
    .bind(article_id)
    .bind(phone)
    .fetch_optional(executor)
    .await?;

    row.map(|row| {
        Ok(InteractionFlags {
            is_like: row.try_get("is_like")?,
            is_collect: row.try_get("is_collect")?,
            has_comment: row.try_get("has_comment")?,
        })
    })
    .transpose()
}

impl InteractionRepository {
    /// Create a new interaction repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply or revoke a like/favorite and adjust the article counter.
    ///
    /// Runs in one transaction holding the article row lock, so concurrent
    /// toggles on an article serialize and the counter matches the rows.
    pub async fn toggle(
        &self,
        article_id: i64,
        phone: &str,
        kind: InteractionKind,
        action: InteractionAction,
    ) -> Result<ToggleOutcome, InteractionError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i64> = sqlx::query_scalar(
            "SELECT article_id FROM articles WHERE article_id = $1 AND status <> 'deleted' FOR UPDATE",
        )
        .bind(article_id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Err(InteractionError::ArticleNotFound);
        }

        let existing = load_flags(&mut *tx, article_id, phone).await?;
        let plan = plan_toggle(existing, kind, action)?;

        match plan.mutation {
            RowMutation::Insert(flags) => {
                sqlx::query(
                    "INSERT INTO userarticles (article_id, phone, is_like, is_collect) VALUES ($1, $2, $3, $4)",
                )
                .bind(article_id)
                .bind(phone)
                .bind(flags.is_like)
                .bind(flags.is_collect)
                .execute(&mut *tx)
                .await?;
            }
            RowMutation::Update(flags) => {
                sqlx::query(
                    "UPDATE userarticles SET is_like = $3, is_collect = $4 WHERE article_id = $1 AND phone = $2",
                )
                .bind(article_id)
                .bind(phone)
                .bind(flags.is_like)
                .bind(flags.is_collect)
                .execute(&mut *tx)
                .await?;
            }
            RowMutation::Delete => {
                sqlx::query("DELETE FROM userarticles WHERE article_id = $1 AND phone = $2")
                    .bind(article_id)
                    .bind(phone)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let column = kind.counter_column();
        let counter_sql = match plan.delta {
            CounterDelta::Increment => format!(
                "UPDATE articles SET {column} = {column} + 1 WHERE article_id = $1 RETURNING {column}"
            ),
            CounterDelta::Decrement => format!(
                "UPDATE articles SET {column} = GREATEST({column} - 1, 0) WHERE article_id = $1 RETURNING {column}"
            ),
        };
        let count: i64 = sqlx::query_scalar(&counter_sql)
            .bind(article_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            "{} toggled {:?} on article {} ({} = {})",
            phone, kind, article_id, column, count
        );

        Ok(ToggleOutcome {
            count,
            active: plan.active,
        })
    }

    /// A user's flags on an article with its counters; `None` if the
    /// article is missing or deleted
    pub async fn status(
        &self,
        article_id: i64,
        phone: Option<&str>,
    ) -> Result<Option<InteractionStatus>> {
        let row = sqlx::query(
            r#"
            SELECT view_count, like_count, comment_count, collect_count
            FROM articles
            WHERE article_id = $1 AND status <> 'deleted'
            "#,
        )
        .bind(article_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let counters: [i64; 4] = [
            row.try_get("view_count")?,
            row.try_get("like_count")?,
            row.try_get("comment_count")?,
            row.try_get("collect_count")?,
        ];

        let flags = match phone {
            Some(phone) => load_flags(&self.pool, article_id, phone)
                .await?
                .unwrap_or_default(),
            None => InteractionFlags::default(),
        };

        Ok(Some(InteractionStatus::new(flags, counters)))
    }
}
