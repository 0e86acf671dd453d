//! User model and related functionality

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User entity
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub phone: String,
    pub username: String,
    pub password_hash: Option<String>,
    pub avatar: String,
    pub profession: String,
    pub position: String,
    pub company: String,
    pub website: String,
    pub introduction: String,
    pub start_work_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user, never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub phone: String,
    pub user_name: String,
    pub user_pic: String,
    pub profession: String,
    pub position: String,
    pub company: String,
    pub website: String,
    pub introduction: String,
    pub start_work_date: Option<NaiveDate>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            phone: user.phone.clone(),
            user_name: user.username.clone(),
            user_pic: user.avatar.clone(),
            profession: user.profession.clone(),
            position: user.position.clone(),
            company: user.company.clone(),
            website: user.website.clone(),
            introduction: user.introduction.clone(),
            start_work_date: user.start_work_date,
        }
    }
}

/// New user creation payload
#[derive(Debug, Clone)]
pub struct NewUser {
    pub phone: String,
    pub username: String,
    pub password_hash: Option<String>,
}

/// Profile update payload, every field is written
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub username: String,
    pub start_work_date: NaiveDate,
    pub profession: String,
    pub position: String,
    pub company: String,
    pub website: String,
    pub introduction: String,
}

/// Default display name for users created without one
pub fn default_username(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("user_{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_username_uses_last_four_digits() {
        assert_eq!(default_username("13912345678"), "user_5678");
        assert_eq!(default_username("123"), "user_123");
    }

    #[test]
    fn test_profile_hides_password_hash() {
        let now = Utc::now();
        let user = User {
            phone: "13912345678".to_string(),
            username: "writer".to_string(),
            password_hash: Some("$argon2id$secret".to_string()),
            avatar: "a.png".to_string(),
            profession: "engineer".to_string(),
            position: String::new(),
            company: String::new(),
            website: String::new(),
            introduction: String::new(),
            start_work_date: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(UserProfile::from(&user)).unwrap();
        assert_eq!(json["userName"], "writer");
        assert_eq!(json["userPic"], "a.png");
        assert!(!json.to_string().contains("argon2"));
    }
}
