//! Captcha repository for database operations

use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;

use crate::models::Captcha;

/// Captcha repository
#[derive(Clone)]
pub struct CaptchaRepository {
    pool: PgPool,
}

impl CaptchaRepository {
    /// Create a new captcha repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a captcha, replacing any code previously sent to the same phone
    pub async fn store(&self, captcha: &Captcha) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO captchas (phone, code, expire_time, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (phone) DO UPDATE SET
            code = EXCLUDED.code,
            expire_time = EXCLUDED.expire_time,
            created_at = EXCLUDED.created_at
            "#,
        )
        .bind(&captcha.phone)
        .bind(&captcha.code)
        .bind(captcha.expire_time)
        .bind(captcha.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Check `code` against the stored captcha and delete it when it matches.
    /// Returns false for a wrong, expired or missing code.
    pub async fn consume(&self, phone: &str, code: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let captcha = sqlx::query_as::<_, Captcha>(
            "SELECT phone, code, expire_time, created_at FROM captchas WHERE phone = $1 FOR UPDATE",
        )
        .bind(phone)
        .fetch_optional(&mut *tx)
        .await?;

        match captcha {
            Some(captcha) if captcha.accepts(code, Utc::now()) => {
                sqlx::query("DELETE FROM captchas WHERE phone = $1")
                    .bind(phone)
                    .execute(&mut *tx)
                    .await?;
                tx.commit().await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Delete every expired captcha
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM captchas WHERE expire_time <= NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
