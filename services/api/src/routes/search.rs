//! Search history and content search handlers

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::IntoResponse,
};
use common::response::ApiResponse;

use super::article::page_of;
use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{
        ArticleFilter, ArticleOrder, Page,
        search::{ClearHistoryRequest, ContentSearchQuery, HistoryQuery, RecordSearchRequest},
    },
    state::AppState,
};

/// Record a keyword in the caller's history
pub async fn record_search(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<RecordSearchRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    user.ensure_matches(payload.phone.as_deref())?;

    state
        .search_history
        .record(&user.phone, &payload.keyword)
        .await?;

    Ok(ApiResponse::message("Search recorded"))
}

/// The caller's most recent keywords
pub async fn list_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    user.ensure_matches(query.phone.as_deref())?;

    let keywords = state.search_history.list(&user.phone, query.limit).await?;
    Ok(ApiResponse::ok("ok", keywords))
}

/// Remove one keyword, or everything when the body names none
pub async fn clear_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let request: ClearHistoryRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ClearHistoryRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::Validation(format!("Invalid request body: {e}")))?
    };
    user.ensure_matches(request.phone.as_deref())?;

    state
        .search_history
        .clear(&user.phone, request.keyword.as_deref())
        .await?;

    Ok(ApiResponse::message("Search history cleared"))
}

/// Substring search over published articles
pub async fn search_contents(
    State(state): State<AppState>,
    query: Result<Query<ContentSearchQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;

    let search = query.search_query.as_deref().map(str::trim).unwrap_or("");
    if search.is_empty() {
        return Err(ApiError::Validation("searchQuery is required".to_string()));
    }
    let order = ArticleOrder::parse_search(query.sort.as_deref()).map_err(ApiError::Validation)?;
    let page = Page::new(query.page, query.limit);

    let articles = page_of(&state, ArticleFilter::search(search), order, page).await?;
    Ok(ApiResponse::ok("ok", articles))
}
