//! Authentication service models

pub mod captcha;
pub mod user;

// Re-export for convenience
pub use captcha::Captcha;
pub use user::{NewUser, UpdateProfile, User, UserProfile};
