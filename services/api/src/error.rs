//! Custom error types for the API service

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::response::ApiResponse;
use std::fmt::Display;
use thiserror::Error;
use tracing::error;

use crate::{interaction::InteractionError, search_history::SearchHistoryError};

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid token
    #[error("Unauthorized")]
    Unauthorized,

    /// Token valid but not for this resource
    #[error("{0}")]
    Forbidden(String),

    /// Article missing or deleted
    #[error("{0}")]
    NotFound(String),

    /// Interaction already applied
    #[error("{0}")]
    AlreadyDone(String),

    /// Interaction never applied
    #[error("{0}")]
    NotDone(String),

    /// Store failure or any other unexpected condition
    #[error("Internal server error")]
    InternalServerError,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyDone(_) | ApiError::NotDone(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ApiResponse::error(self.status(), self.to_string()).into_response()
    }
}

impl From<InteractionError> for ApiError {
    fn from(err: InteractionError) -> Self {
        match err {
            InteractionError::ArticleNotFound => ApiError::NotFound(err.to_string()),
            InteractionError::AlreadyDone(_) => ApiError::AlreadyDone(err.to_string()),
            InteractionError::NotDone(_) => ApiError::NotDone(err.to_string()),
            InteractionError::Database(e) => {
                error!("Interaction toggle failed: {}", e);
                ApiError::InternalServerError
            }
        }
    }
}

impl From<SearchHistoryError> for ApiError {
    fn from(err: SearchHistoryError) -> Self {
        match err {
            SearchHistoryError::Validation(msg) => ApiError::Validation(msg),
            SearchHistoryError::Unavailable => ApiError::InternalServerError,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Log an infrastructure failure and hide it behind a 500
pub fn internal<E: Display>(action: &'static str) -> impl FnOnce(E) -> ApiError {
    move |e| {
        error!("Failed to {}: {}", action, e);
        ApiError::InternalServerError
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::InteractionKind;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("bad".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Forbidden("no".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotDone("never".into()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::InternalServerError.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_interaction_errors_map_to_conflicts() {
        let err = ApiError::from(InteractionError::AlreadyDone(InteractionKind::Like));
        assert!(matches!(err, ApiError::AlreadyDone(ref msg) if msg == "Article already liked"));

        let err = ApiError::from(InteractionError::NotDone(InteractionKind::Favorite));
        assert!(matches!(err, ApiError::NotDone(ref msg) if msg == "Article not favorited yet"));

        let err = ApiError::from(InteractionError::ArticleNotFound);
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_search_history_errors() {
        let err = ApiError::from(SearchHistoryError::Validation("Keyword is required".into()));
        assert_eq!(err.to_string(), "Keyword is required");

        let err = ApiError::from(SearchHistoryError::Unavailable);
        assert!(matches!(err, ApiError::InternalServerError));
    }
}
