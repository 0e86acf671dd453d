//! Article catalog handlers

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use common::response::ApiResponse;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult, internal},
    middleware::AuthUser,
    models::{
        ArticleFilter, ArticleOrder, ArticlePage, ArticleStatus, Page,
        article::{CreateArticleRequest, UpdateArticleRequest},
    },
    state::AppState,
};

/// Query parameters for article listing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleListQuery {
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub status: Option<String>,
}

/// Query parameters for the recommend and latest feeds
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

const ARTICLE_NOT_FOUND: &str = "Article not found";

fn not_found() -> ApiError {
    ApiError::NotFound(ARTICLE_NOT_FOUND.to_string())
}

pub(super) async fn page_of(
    state: &AppState,
    filter: ArticleFilter,
    order: ArticleOrder,
    page: Page,
) -> ApiResult<ArticlePage> {
    let (list, total) = state
        .article_repository
        .list(&filter, order, page)
        .await
        .map_err(internal("list articles"))?;

    Ok(ArticlePage::new(list, total, page))
}

/// Filtered, sorted, paginated listing
pub async fn list_articles(
    State(state): State<AppState>,
    query: Result<Query<ArticleListQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;

    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => ArticleStatus::Published,
        Some(value) => ArticleStatus::parse_visible(value).map_err(ApiError::Validation)?,
    };
    let order = ArticleOrder::parse(query.sort_by.as_deref(), query.sort_order.as_deref())
        .map_err(ApiError::Validation)?;
    let filter = ArticleFilter::new(status, query.category.as_deref());
    let page = Page::new(query.page, query.limit);

    let articles = page_of(&state, filter, order, page).await?;
    Ok(ApiResponse::ok("ok", articles))
}

async fn feed(
    state: &AppState,
    query: Result<Query<FeedQuery>, QueryRejection>,
    order: ArticleOrder,
) -> ApiResult<ApiResponse<ArticlePage>> {
    let Query(query) = query?;
    let filter = ArticleFilter::new(ArticleStatus::Published, query.category.as_deref());
    let page = Page::new(query.page, query.limit);

    let articles = page_of(state, filter, order, page).await?;
    Ok(ApiResponse::ok("ok", articles))
}

/// Published articles ranked by views and likes
pub async fn recommend_articles(
    State(state): State<AppState>,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    feed(&state, query, ArticleOrder::Hot).await
}

/// Published articles, newest first
pub async fn latest_articles(
    State(state): State<AppState>,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    feed(&state, query, ArticleOrder::Latest).await
}

/// Article detail; counts as a view
pub async fn get_article(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(article_id) = path?;

    let article = state
        .article_repository
        .get_for_view(article_id)
        .await
        .map_err(internal("get article"))?
        .ok_or_else(not_found)?;

    Ok(ApiResponse::ok("ok", article))
}

/// Create an article owned by the caller
pub async fn create_article(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateArticleRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    user.ensure_matches(payload.user_phone.as_deref())?;

    let article = payload.validate().map_err(ApiError::Validation)?;
    let article_id = state
        .article_repository
        .create(&user.phone, &article)
        .await
        .map_err(internal("create article"))?;

    Ok(ApiResponse::with_status(
        StatusCode::CREATED,
        "Article created",
        json!({ "articleId": article_id }),
    ))
}

/// Check that the caller may modify a live article
async fn authorize_author(state: &AppState, article_id: i64, user: &AuthUser) -> ApiResult<bool> {
    let ownership = state
        .article_repository
        .ownership(article_id)
        .await
        .map_err(internal("look up article"))?
        .ok_or_else(not_found)?;

    if ownership.author_phone != user.phone {
        return Err(ApiError::Forbidden(
            "Only the author may modify this article".to_string(),
        ));
    }
    Ok(ownership.deleted)
}

/// Partial update by the author
pub async fn update_article(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateArticleRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(article_id) = path?;
    let Json(payload) = payload?;
    user.ensure_matches(payload.user_phone.as_deref())?;

    let changes = payload.validate().map_err(ApiError::Validation)?;

    if authorize_author(&state, article_id, &user).await? {
        return Err(not_found());
    }

    let article = state
        .article_repository
        .update(article_id, &changes)
        .await
        .map_err(internal("update article"))?
        .ok_or_else(not_found)?;

    info!("{} updated article {}", user.phone, article_id);
    Ok(ApiResponse::ok("Article updated", article))
}

/// Soft delete by the author; repeating it is harmless
pub async fn delete_article(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(article_id) = path?;

    if !authorize_author(&state, article_id, &user).await? {
        state
            .article_repository
            .soft_delete(article_id)
            .await
            .map_err(internal("delete article"))?;
        info!("{} deleted article {}", user.phone, article_id);
    }

    Ok(ApiResponse::message("Article deleted"))
}
