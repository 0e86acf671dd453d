//! Authentication middleware for JWT token validation

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use common::jwt::bearer_token;
use tracing::warn;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub phone: String,
}

impl AuthUser {
    /// Reject a body/query phone that names someone else
    pub fn ensure_matches(&self, claimed: Option<&str>) -> Result<(), ApiError> {
        match claimed.map(str::trim) {
            Some(phone) if !phone.is_empty() && phone != self.phone => Err(ApiError::Forbidden(
                "Token does not belong to this user".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or(ApiError::Unauthorized)?;

    let claims = state.jwt_service.validate_token(token).map_err(|e| {
        warn!("Rejected token: {}", e);
        ApiError::Unauthorized
    })?;

    req.extensions_mut().insert(AuthUser { phone: claims.sub });

    Ok(next.run(req).await)
}
