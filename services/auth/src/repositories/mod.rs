//! Repositories for the authentication service

pub mod captcha;
pub mod user;

pub use captcha::CaptchaRepository;
pub use user::UserRepository;
