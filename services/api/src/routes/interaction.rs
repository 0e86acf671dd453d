//! Like, favorite, interaction status and report handlers

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::IntoResponse,
};
use common::response::ApiResponse;
use serde_json::json;

use crate::{
    error::{ApiError, ApiResult, internal},
    interaction::InteractionKind,
    middleware::AuthUser,
    models::interaction::{InteractionQuery, ReportOutcome, ReportRequest, ToggleRequest},
    state::AppState,
};

async fn toggle(
    state: &AppState,
    user: &AuthUser,
    article_id: i64,
    payload: ToggleRequest,
    kind: InteractionKind,
) -> ApiResult<(i64, bool)> {
    user.ensure_matches(payload.phone.as_deref())?;
    let action = kind
        .parse_action(payload.action.trim())
        .map_err(ApiError::Validation)?;

    let outcome = state
        .interaction_repository
        .toggle(article_id, &user.phone, kind, action)
        .await?;

    Ok((outcome.count, outcome.active))
}

/// Like or unlike an article
pub async fn like_article(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(article_id) = path?;
    let Json(payload) = payload?;

    let (like_count, is_liked) =
        toggle(&state, &user, article_id, payload, InteractionKind::Like).await?;

    let message = if is_liked { "Liked" } else { "Unliked" };
    Ok(ApiResponse::ok(
        message,
        json!({ "likeCount": like_count, "isLiked": is_liked }),
    ))
}

/// Favorite or unfavorite an article
pub async fn favorite_article(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(article_id) = path?;
    let Json(payload) = payload?;

    let (collect_count, is_favorited) =
        toggle(&state, &user, article_id, payload, InteractionKind::Favorite).await?;

    let message = if is_favorited {
        "Favorited"
    } else {
        "Unfavorited"
    };
    Ok(ApiResponse::ok(
        message,
        json!({ "collectCount": collect_count, "isFavorited": is_favorited }),
    ))
}

/// Flags for `phone` plus the article counters
pub async fn interaction_status(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<InteractionQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(article_id) = path?;
    let Query(query) = query?;
    let phone = query.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());

    let status = state
        .interaction_repository
        .status(article_id, phone)
        .await
        .map_err(internal("load interaction status"))?
        .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;

    Ok(ApiResponse::ok("ok", status))
}

/// Report an article; once per user
pub async fn report_article(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(article_id) = path?;
    let Json(payload) = payload?;
    user.ensure_matches(payload.phone.as_deref())?;

    let reason = payload.reason().map_err(ApiError::Validation)?;

    let outcome = state
        .report_repository
        .file(article_id, &user.phone, &reason)
        .await
        .map_err(internal("file report"))?;

    match outcome {
        ReportOutcome::Filed => Ok(ApiResponse::message("Report submitted")),
        ReportOutcome::Duplicate => Err(ApiError::AlreadyDone(
            "Article already reported".to_string(),
        )),
        ReportOutcome::ArticleNotFound => Err(ApiError::NotFound("Article not found".to_string())),
    }
}
