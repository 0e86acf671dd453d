//! Error type for the authentication service

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::response::ApiResponse;
use thiserror::Error;
use tracing::error;

/// Authentication service errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Captcha wrong or expired
    #[error("Captcha is invalid or has expired")]
    InvalidCaptcha,

    /// No user with this phone
    #[error("User not found")]
    UserNotFound,

    /// Password did not verify
    #[error("Wrong password")]
    WrongPassword,

    /// Missing or invalid token
    #[error("Unauthorized")]
    Unauthorized,

    /// Token valid but not for this resource
    #[error("{0}")]
    Forbidden(String),

    /// Resource already exists
    #[error("{0}")]
    Conflict(String),

    /// Rate limit hit
    #[error("Too many requests, please try again later")]
    TooManyRequests,

    /// Store failure or any other unexpected condition
    #[error("Internal server error")]
    InternalServerError,
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::InvalidCaptcha => StatusCode::BAD_REQUEST,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::WrongPassword | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AuthError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiResponse::error(self.status(), self.to_string()).into_response()
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::Validation(rejection.body_text())
    }
}

/// Log an infrastructure failure and hide it behind a 500
pub fn internal(action: &'static str) -> impl FnOnce(anyhow::Error) -> AuthError {
    move |e| {
        error!("Failed to {}: {}", action, e);
        AuthError::InternalServerError
    }
}

/// Type alias for auth results
pub type AuthResult<T> = Result<T, AuthError>;
