//! Middleware for JWT token validation and authentication

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use common::jwt::bearer_token;
use tracing::warn;

use crate::{AppState, error::AuthError};

/// Identity taken from a validated token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub phone: String,
}

/// Extract and validate the JWT from the Authorization header
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::Unauthorized)?;

    let claims = state.jwt_service.validate_token(token).map_err(|e| {
        warn!("Rejected token: {}", e);
        AuthError::Unauthorized
    })?;

    req.extensions_mut().insert(AuthUser { phone: claims.sub });

    Ok(next.run(req).await)
}
