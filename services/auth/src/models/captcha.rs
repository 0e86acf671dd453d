//! Captcha model

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::FromRow;

/// How long a captcha stays usable
pub const CAPTCHA_TTL_SECONDS: i64 = 60;

/// Captcha entity
#[derive(Debug, Clone, FromRow)]
pub struct Captcha {
    pub phone: String,
    pub code: String,
    pub expire_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Captcha {
    /// Issue a fresh 6-digit code for `phone`
    pub fn generate(phone: &str, now: DateTime<Utc>) -> Self {
        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
        Self {
            phone: phone.to_string(),
            code,
            expire_time: now + Duration::seconds(CAPTCHA_TTL_SECONDS),
            created_at: now,
        }
    }

    /// Usable iff the code matches and it has not expired yet
    pub fn accepts(&self, code: &str, now: DateTime<Utc>) -> bool {
        self.code == code && now < self.expire_time
    }
}
