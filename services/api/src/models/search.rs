//! Search history and content search models

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A persisted keyword and when it was last searched
#[derive(Debug, Clone, PartialEq)]
pub struct StoredKeyword {
    pub keyword: String,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /search/history`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordSearchRequest {
    pub keyword: String,
    #[serde(alias = "userPhone")]
    pub phone: Option<String>,
}

/// Query of `GET /search/history`
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    #[serde(alias = "userPhone")]
    pub phone: Option<String>,
}

/// Body of `DELETE /search/history`; no keyword clears everything
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClearHistoryRequest {
    pub keyword: Option<String>,
    #[serde(alias = "userPhone")]
    pub phone: Option<String>,
}

/// Query of `GET /search/contents`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSearchQuery {
    pub search_query: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
}
