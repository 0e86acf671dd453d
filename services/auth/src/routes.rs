//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::Utc;
use common::response::ApiResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    AppState,
    error::{AuthError, AuthResult, internal},
    middleware::{AuthUser, auth_middleware},
    models::{Captcha, NewUser, UpdateProfile, UserProfile, user::default_username},
    password::{hash_password, verify_password},
    validation,
};

/// Password and registration tokens live for a day
const PASSWORD_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Captcha tokens live for four hours
const CAPTCHA_TOKEN_TTL: Duration = Duration::from_secs(4 * 60 * 60);
/// Avatars arrive as data URLs
const AVATAR_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Request for password login
#[derive(Deserialize)]
pub struct PasswordLoginRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
}

/// Request for sending a captcha
#[derive(Deserialize)]
pub struct SendCaptchaRequest {
    #[serde(default)]
    pub phone: String,
}

/// Request for captcha login
#[derive(Deserialize)]
pub struct CaptchaLoginRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub captcha: String,
}

/// Request for explicit registration
#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub captcha: String,
    pub username: Option<String>,
}

/// Request for a password reset
#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub captcha: String,
}

/// Request for a profile update
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUserInfoRequest {
    pub user_name: String,
    pub start_work_date: String,
    pub profession: String,
    pub position: String,
    pub company: String,
    pub website: String,
    pub introduction: String,
    pub user_phone: Option<String>,
}

/// Request for an avatar update
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPicRequest {
    #[serde(default)]
    pub user_pic: String,
    pub user_phone: Option<String>,
}

/// Token plus profile
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_info: UserProfile,
}

/// Token from a captcha login
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaLoginResponse {
    pub token: String,
    pub is_new_user: bool,
    pub user_info: UserProfile,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/user/info", get(get_user_info))
        .route("/user/updateUserInfo", put(update_user_info))
        .route("/user/updateUserPic", put(update_user_pic))
        .layer(DefaultBodyLimit::max(AVATAR_MAX_BYTES + 1024))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/passwordLogin", post(password_login))
        .route("/sendCaptcha", post(send_captcha))
        .route("/captchaLogin", post(captcha_login))
        .route("/register", post(register))
        .route("/updatePassword", post(update_password))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn check(result: Result<(), String>) -> AuthResult<()> {
    result.map_err(AuthError::Validation)
}

fn ensure_same_user(user: &AuthUser, claimed: Option<&str>) -> AuthResult<()> {
    match claimed {
        Some(phone) if !phone.is_empty() && phone != user.phone => Err(AuthError::Forbidden(
            "Token does not belong to this user".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    ApiResponse::ok("ok", json!({ "service": "auth-service" }))
}

/// Phone + password login
pub async fn password_login(
    State(state): State<AppState>,
    payload: Result<Json<PasswordLoginRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload?;
    check(validation::validate_phone(&payload.phone))?;
    if payload.password.is_empty() {
        return Err(AuthError::Validation("Password is required".to_string()));
    }

    info!("Password login attempt for user: {}", payload.phone);

    let limiter_key = format!("login:{}", payload.phone);
    if !state.login_limiter.is_allowed(&limiter_key).await {
        return Err(AuthError::TooManyRequests);
    }

    let user = state
        .user_repository
        .find_by_phone(&payload.phone)
        .await
        .map_err(internal("look up user"))?
        .ok_or(AuthError::UserNotFound)?;

    let verified = user
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(&payload.password, hash));
    if !verified {
        return Err(AuthError::WrongPassword);
    }

    state.login_limiter.reset(&limiter_key).await;

    let token = state
        .jwt_service
        .issue(&user.phone, PASSWORD_TOKEN_TTL)
        .map_err(internal("issue token"))?;

    Ok(ApiResponse::ok(
        "Login successful",
        LoginResponse {
            token,
            user_info: UserProfile::from(&user),
        },
    ))
}

/// Generate and store a captcha for the phone
pub async fn send_captcha(
    State(state): State<AppState>,
    payload: Result<Json<SendCaptchaRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload?;
    check(validation::validate_phone(&payload.phone))?;

    if !state.captcha_limiter.is_allowed(&payload.phone).await {
        return Err(AuthError::TooManyRequests);
    }

    let captcha = Captcha::generate(&payload.phone, Utc::now());
    state
        .captcha_repository
        .store(&captcha)
        .await
        .map_err(internal("store captcha"))?;

    // No SMS gateway: the code is delivered through the log and the response
    info!("Captcha for {}: {}", captcha.phone, captcha.code);

    Ok(ApiResponse::message(format!(
        "Captcha sent: {}",
        captcha.code
    )))
}

/// Consume a captcha; guesses count against the phone until one succeeds
async fn verify_captcha(state: &AppState, phone: &str, code: &str) -> AuthResult<()> {
    let limiter_key = format!("captcha:{phone}");
    if !state.login_limiter.is_allowed(&limiter_key).await {
        return Err(AuthError::TooManyRequests);
    }

    let accepted = state
        .captcha_repository
        .consume(phone, code)
        .await
        .map_err(internal("verify captcha"))?;
    if !accepted {
        return Err(AuthError::InvalidCaptcha);
    }

    state.login_limiter.reset(&limiter_key).await;
    Ok(())
}

/// Phone + captcha login, registering unseen phones
pub async fn captcha_login(
    State(state): State<AppState>,
    payload: Result<Json<CaptchaLoginRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload?;
    check(validation::validate_phone(&payload.phone))?;
    check(validation::validate_captcha(&payload.captcha))?;

    verify_captcha(&state, &payload.phone, &payload.captcha).await?;

    let (user, is_new_user) = state
        .user_repository
        .find_or_register(&NewUser {
            phone: payload.phone.clone(),
            username: default_username(&payload.phone),
            password_hash: None,
        })
        .await
        .map_err(internal("register user"))?;

    let token = state
        .jwt_service
        .issue(&user.phone, CAPTCHA_TOKEN_TTL)
        .map_err(internal("issue token"))?;

    let message = if is_new_user {
        info!("Registered new user via captcha: {}", user.phone);
        "Registration successful"
    } else {
        "Login successful"
    };

    Ok(ApiResponse::ok(
        message,
        CaptchaLoginResponse {
            token,
            is_new_user,
            user_info: UserProfile::from(&user),
        },
    ))
}

/// Explicit registration with a password
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload?;
    check(validation::validate_phone(&payload.phone))?;
    check(validation::validate_password(&payload.password))?;
    check(validation::validate_captcha(&payload.captcha))?;
    let username = match payload.username.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => {
            check(validation::validate_username(name))?;
            name.to_string()
        }
        _ => default_username(&payload.phone),
    };

    let already_registered = state
        .user_repository
        .find_by_phone(&payload.phone)
        .await
        .map_err(internal("look up user"))?
        .is_some();
    if already_registered {
        return Err(AuthError::Conflict("Phone number is already registered".to_string()));
    }

    verify_captcha(&state, &payload.phone, &payload.captcha).await?;

    let password_hash = hash_password(&payload.password).map_err(internal("hash password"))?;
    let user = state
        .user_repository
        .create(&NewUser {
            phone: payload.phone.clone(),
            username,
            password_hash: Some(password_hash),
        })
        .await
        .map_err(internal("create user"))?
        .ok_or_else(|| AuthError::Conflict("Phone number is already registered".to_string()))?;

    let token = state
        .jwt_service
        .issue(&user.phone, PASSWORD_TOKEN_TTL)
        .map_err(internal("issue token"))?;

    Ok(ApiResponse::with_status(
        StatusCode::CREATED,
        "Registration successful",
        LoginResponse {
            token,
            user_info: UserProfile::from(&user),
        },
    ))
}

/// Reset the password after re-authenticating with a captcha
pub async fn update_password(
    State(state): State<AppState>,
    payload: Result<Json<UpdatePasswordRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload?;
    check(validation::validate_phone(&payload.phone))?;
    check(validation::validate_password(&payload.password))?;
    check(validation::validate_captcha(&payload.captcha))?;

    state
        .user_repository
        .find_by_phone(&payload.phone)
        .await
        .map_err(internal("look up user"))?
        .ok_or(AuthError::UserNotFound)?;

    verify_captcha(&state, &payload.phone, &payload.captcha).await?;

    let password_hash = hash_password(&payload.password).map_err(internal("hash password"))?;
    let updated = state
        .user_repository
        .update_password(&payload.phone, &password_hash)
        .await
        .map_err(internal("update password"))?;
    if !updated {
        return Err(AuthError::UserNotFound);
    }

    state
        .login_limiter
        .reset(&format!("login:{}", payload.phone))
        .await;

    Ok(ApiResponse::message("Password updated"))
}

/// Profile of the authenticated user
pub async fn get_user_info(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AuthResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_phone(&user.phone)
        .await
        .map_err(internal("look up user"))?
        .ok_or(AuthError::UserNotFound)?;

    Ok(ApiResponse::ok("ok", UserProfile::from(&user)))
}

/// Replace the authenticated user's profile fields
pub async fn update_user_info(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<UpdateUserInfoRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload?;
    ensure_same_user(&user, payload.user_phone.as_deref())?;

    let profile = parse_profile(payload)?;
    let updated = state
        .user_repository
        .update_profile(&user.phone, &profile)
        .await
        .map_err(internal("update profile"))?
        .ok_or(AuthError::UserNotFound)?;

    Ok(ApiResponse::ok("Profile updated", UserProfile::from(&updated)))
}

fn parse_profile(payload: UpdateUserInfoRequest) -> AuthResult<UpdateProfile> {
    check(validation::validate_username(&payload.user_name))?;
    let start_work_date =
        validation::parse_start_work_date(&payload.start_work_date, Utc::now().date_naive())
            .map_err(AuthError::Validation)?;
    if payload.profession.trim().is_empty() {
        return Err(AuthError::Validation("Profession is required".to_string()));
    }
    check(validation::validate_max_length("Profession", &payload.profession, 50))?;
    check(validation::validate_max_length("Position", &payload.position, 50))?;
    check(validation::validate_max_length("Company", &payload.company, 50))?;
    check(validation::validate_website(&payload.website))?;
    check(validation::validate_max_length(
        "Introduction",
        &payload.introduction,
        100,
    ))?;

    Ok(UpdateProfile {
        username: payload.user_name.trim().to_string(),
        start_work_date,
        profession: payload.profession.trim().to_string(),
        position: payload.position,
        company: payload.company,
        website: payload.website,
        introduction: payload.introduction,
    })
}

/// Replace the authenticated user's avatar
pub async fn update_user_pic(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<UpdateUserPicRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload?;
    ensure_same_user(&user, payload.user_phone.as_deref())?;

    if payload.user_pic.is_empty() {
        return Err(AuthError::Validation("Avatar is required".to_string()));
    }
    if payload.user_pic.len() > AVATAR_MAX_BYTES {
        return Err(AuthError::Validation("Avatar is too large".to_string()));
    }

    let updated = state
        .user_repository
        .update_avatar(&user.phone, &payload.user_pic)
        .await
        .map_err(internal("update avatar"))?;
    if !updated {
        return Err(AuthError::UserNotFound);
    }

    Ok(ApiResponse::ok(
        "Avatar updated",
        json!({ "userPic": payload.user_pic }),
    ))
}
