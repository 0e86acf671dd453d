//! User repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use crate::models::{NewUser, UpdateProfile, User};

const USER_COLUMNS: &str = "phone, username, password_hash, avatar, profession, position, \
     company, website, introduction, start_work_date, created_at, updated_at";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user; `None` when the phone is already registered
    pub async fn create(&self, new_user: &NewUser) -> Result<Option<User>> {
        info!("Creating new user: {}", new_user.phone);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (phone, username, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (phone) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.phone)
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by phone
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE phone = $1"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Return the user for `phone`, registering it first if it is unseen.
    /// The flag is true when this call created the user.
    pub async fn find_or_register(&self, new_user: &NewUser) -> Result<(User, bool)> {
        if let Some(user) = self.find_by_phone(&new_user.phone).await? {
            return Ok((user, false));
        }

        match self.create(new_user).await? {
            Some(user) => Ok((user, true)),
            // Lost a race with a concurrent registration
            None => {
                let user = self
                    .find_by_phone(&new_user.phone)
                    .await?
                    .ok_or_else(|| anyhow::anyhow!("User {} vanished after insert", new_user.phone))?;
                Ok((user, false))
            }
        }
    }

    /// Overwrite the stored password hash
    pub async fn update_password(&self, phone: &str, password_hash: &str) -> Result<bool> {
        info!("Updating password for user: {}", phone);

        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = NOW() WHERE phone = $2",
        )
        .bind(password_hash)
        .bind(phone)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace the editable profile fields
    pub async fn update_profile(&self, phone: &str, profile: &UpdateProfile) -> Result<Option<User>> {
        info!("Updating profile for user: {}", phone);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = $1, start_work_date = $2, profession = $3, position = $4,
                company = $5, website = $6, introduction = $7, updated_at = NOW()
            WHERE phone = $8
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&profile.username)
        .bind(profile.start_work_date)
        .bind(&profile.profession)
        .bind(&profile.position)
        .bind(&profile.company)
        .bind(&profile.website)
        .bind(&profile.introduction)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Replace the avatar
    pub async fn update_avatar(&self, phone: &str, avatar: &str) -> Result<bool> {
        let result =
            sqlx::query("UPDATE users SET avatar = $1, updated_at = NOW() WHERE phone = $2")
                .bind(avatar)
                .bind(phone)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
