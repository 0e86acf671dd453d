//! Interaction and report models

use serde::{Deserialize, Serialize};

use crate::interaction::InteractionFlags;

/// Minimum report reason length, in characters
pub const MIN_REPORT_REASON_CHARS: usize = 5;

/// A user's flags on an article plus the article counters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionStatus {
    pub is_like: bool,
    pub is_collect: bool,
    pub has_comment: bool,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub collect_count: i64,
}

impl InteractionStatus {
    pub fn new(flags: InteractionFlags, counters: [i64; 4]) -> Self {
        let [view_count, like_count, comment_count, collect_count] = counters;
        Self {
            is_like: flags.is_like,
            is_collect: flags.is_collect,
            has_comment: flags.has_comment,
            view_count,
            like_count,
            comment_count,
            collect_count,
        }
    }
}

/// Body of the like and favorite endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToggleRequest {
    pub action: String,
    #[serde(alias = "userPhone")]
    pub phone: Option<String>,
}

/// Query of the interaction status endpoint
#[derive(Debug, Default, Deserialize)]
pub struct InteractionQuery {
    #[serde(alias = "userPhone")]
    pub phone: Option<String>,
}

/// Body of the report endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRequest {
    pub reason: String,
    #[serde(alias = "userPhone")]
    pub phone: Option<String>,
}

impl ReportRequest {
    /// Trimmed reason, if long enough
    pub fn reason(&self) -> Result<String, String> {
        let reason = self.reason.trim();
        if reason.chars().count() < MIN_REPORT_REASON_CHARS {
            return Err(format!(
                "Report reason must be at least {MIN_REPORT_REASON_CHARS} characters long"
            ));
        }
        Ok(reason.to_string())
    }
}

/// Outcome of filing a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Filed,
    Duplicate,
    ArticleNotFound,
}
