//! Application state shared across handlers

use common::jwt::JwtService;

use crate::{
    repositories::{ArticleRepository, InteractionRepository, ReportRepository},
    search_history::SearchHistoryService,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub article_repository: ArticleRepository,
    pub interaction_repository: InteractionRepository,
    pub report_repository: ReportRepository,
    pub search_history: SearchHistoryService,
    pub jwt_service: JwtService,
}
