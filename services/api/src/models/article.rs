//! Article models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category value meaning "no category filter"
pub const ALL_CATEGORIES: &str = "comprehensive";

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

/// Lifecycle of an article; rows are never removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleStatus {
    Draft,
    Published,
    Deleted,
}

impl ArticleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
            ArticleStatus::Deleted => "deleted",
        }
    }

    /// Statuses a client may list or write
    pub fn parse_visible(value: &str) -> Result<Self, String> {
        match value {
            "draft" => Ok(ArticleStatus::Draft),
            "published" => Ok(ArticleStatus::Published),
            _ => Err("Status must be 'draft' or 'published'".to_string()),
        }
    }
}

/// Article model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub article_id: i64,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub author: String,
    pub author_phone: String,
    pub cover: String,
    pub category: String,
    pub tag: String,
    pub status: String,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub collect_count: i64,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

/// 1-indexed page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Response for article listings with pagination
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePage {
    pub list: Vec<Article>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl ArticlePage {
    pub fn new(list: Vec<Article>, total: i64, page: Page) -> Self {
        Self {
            list,
            total,
            page: page.page,
            limit: page.limit,
            total_pages: (total + page.limit - 1) / page.limit,
        }
    }
}

/// Whitelisted sort columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreateTime,
    UpdateTime,
    ViewCount,
    LikeCount,
    CommentCount,
    CollectCount,
}

impl SortField {
    fn parse(value: &str) -> Result<Self, String> {
        match value {
            "createTime" => Ok(SortField::CreateTime),
            "updateTime" => Ok(SortField::UpdateTime),
            "viewCount" => Ok(SortField::ViewCount),
            "likeCount" => Ok(SortField::LikeCount),
            "commentCount" => Ok(SortField::CommentCount),
            "collectCount" => Ok(SortField::CollectCount),
            other => Err(format!("Unsupported sortBy: {other}")),
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortField::CreateTime => "create_time",
            SortField::UpdateTime => "update_time",
            SortField::ViewCount => "view_count",
            SortField::LikeCount => "like_count",
            SortField::CommentCount => "comment_count",
            SortField::CollectCount => "collect_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn parse(value: &str) -> Result<Self, String> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err("sortOrder must be 'asc' or 'desc'".to_string()),
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// How a listing is ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleOrder {
    By(SortField, SortDirection),
    /// 0.7 views + 0.3 likes, newest first on ties
    Hot,
    Latest,
}

impl ArticleOrder {
    /// Order for the list endpoint; blank values fall back to newest first
    pub fn parse(sort_by: Option<&str>, sort_order: Option<&str>) -> Result<Self, String> {
        let field = match sort_by.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => SortField::parse(value)?,
            None => SortField::CreateTime,
        };
        let direction = match sort_order.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => SortDirection::parse(value)?,
            None => SortDirection::Desc,
        };
        Ok(ArticleOrder::By(field, direction))
    }

    /// Order for content search: `latest` (default) or `hot`
    pub fn parse_search(sort: Option<&str>) -> Result<Self, String> {
        match sort.map(str::trim).unwrap_or("") {
            "" | "latest" => Ok(ArticleOrder::Latest),
            "hot" => Ok(ArticleOrder::Hot),
            _ => Err("sort must be 'latest' or 'hot'".to_string()),
        }
    }
}

/// Predicate shared by a listing and its count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleFilter {
    pub status: ArticleStatus,
    pub category: Option<String>,
    /// Already escaped ILIKE pattern
    pub pattern: Option<String>,
}

impl ArticleFilter {
    pub fn new(status: ArticleStatus, category: Option<&str>) -> Self {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
            .map(str::to_string);

        Self {
            status,
            category,
            pattern: None,
        }
    }

    /// Published articles whose text contains `query`
    pub fn search(query: &str) -> Self {
        Self {
            status: ArticleStatus::Published,
            category: None,
            pattern: Some(format!("%{}%", escape_like(query))),
        }
    }
}

/// Escape LIKE wildcards so user input matches literally
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Validated article for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub author: String,
    pub cover: String,
    pub category: String,
    pub tag: String,
    pub status: ArticleStatus,
}

/// Fields to overwrite on update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub cover: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub status: Option<ArticleStatus>,
}

impl ArticleChanges {
    pub fn is_empty(&self) -> bool {
        *self == ArticleChanges::default()
    }
}

/// Request for article creation
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateArticleRequest {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub author: String,
    pub cover: String,
    pub category: String,
    pub tag: String,
    pub status: Option<String>,
    pub user_phone: Option<String>,
}

/// Request for a partial article update
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub cover: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub status: Option<String>,
    pub user_phone: Option<String>,
}

fn required(field: &str, value: &str, max: usize) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{field} is required"));
    }
    limited(field, value, max)
}

fn limited(field: &str, value: &str, max: usize) -> Result<String, String> {
    if value.chars().count() > max {
        return Err(format!("{field} must be at most {max} characters long"));
    }
    Ok(value.to_string())
}

impl CreateArticleRequest {
    pub fn validate(self) -> Result<NewArticle, String> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => ArticleStatus::Draft,
            Some(value) => ArticleStatus::parse_visible(value)?,
        };

        Ok(NewArticle {
            title: required("Title", &self.title, 200)?,
            content: required("Content", &self.content, usize::MAX)?,
            summary: self.summary,
            author: required("Author", &self.author, 64)?,
            cover: self.cover,
            category: required("Category", &self.category, 64)?,
            tag: limited("Tag", &self.tag, 200)?,
            status,
        })
    }
}

impl UpdateArticleRequest {
    pub fn validate(self) -> Result<ArticleChanges, String> {
        let changes = ArticleChanges {
            title: self.title.map(|v| required("Title", &v, 200)).transpose()?,
            content: self
                .content
                .map(|v| required("Content", &v, usize::MAX))
                .transpose()?,
            summary: self.summary,
            author: self.author.map(|v| required("Author", &v, 64)).transpose()?,
            cover: self.cover,
            category: self
                .category
                .map(|v| required("Category", &v, 64))
                .transpose()?,
            tag: self.tag.map(|v| limited("Tag", &v, 200)).transpose()?,
            status: self
                .status
                .map(|v| ArticleStatus::parse_visible(v.trim()))
                .transpose()?,
        };

        if changes.is_empty() {
            return Err("No fields to update".to_string());
        }
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_clamps() {
        assert_eq!(Page::new(None, None), Page { page: 1, limit: 10 });
        assert_eq!(Page::new(Some(0), Some(0)), Page { page: 1, limit: 1 });
        assert_eq!(Page::new(Some(3), Some(500)).limit, 100);
        assert_eq!(Page::new(Some(2), Some(10)).offset(), 10);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = ArticlePage::new(Vec::new(), 25, Page::new(Some(2), Some(10)));
        assert_eq!(page.total_pages, 3);
        assert_eq!(ArticlePage::new(Vec::new(), 0, Page::new(None, None)).total_pages, 0);
        assert_eq!(ArticlePage::new(Vec::new(), 20, Page::new(None, None)).total_pages, 2);
    }

    #[test]
    fn test_order_whitelist() {
        assert_eq!(
            ArticleOrder::parse(None, None),
            Ok(ArticleOrder::By(SortField::CreateTime, SortDirection::Desc))
        );
        assert_eq!(
            ArticleOrder::parse(Some("likeCount"), Some("ASC")),
            Ok(ArticleOrder::By(SortField::LikeCount, SortDirection::Asc))
        );
        assert!(ArticleOrder::parse(Some("title; DROP TABLE articles"), None).is_err());
        assert!(ArticleOrder::parse(None, Some("sideways")).is_err());
    }

    #[test]
    fn test_search_order() {
        assert_eq!(ArticleOrder::parse_search(None), Ok(ArticleOrder::Latest));
        assert_eq!(ArticleOrder::parse_search(Some("hot")), Ok(ArticleOrder::Hot));
        assert!(ArticleOrder::parse_search(Some("random")).is_err());
    }

    #[test]
    fn test_comprehensive_category_is_no_filter() {
        assert_eq!(
            ArticleFilter::new(ArticleStatus::Published, Some("comprehensive")).category,
            None
        );
        assert_eq!(ArticleFilter::new(ArticleStatus::Published, Some(" ")).category, None);
        assert_eq!(
            ArticleFilter::new(ArticleStatus::Draft, Some("rust")).category,
            Some("rust".to_string())
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
        assert_eq!(
            ArticleFilter::search("a_b").pattern,
            Some("%a\\_b%".to_string())
        );
    }

    #[test]
    fn test_visible_status() {
        assert_eq!(ArticleStatus::parse_visible("draft"), Ok(ArticleStatus::Draft));
        assert!(ArticleStatus::parse_visible("deleted").is_err());
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateArticleRequest {
            title: " Hello ".to_string(),
            content: "Body".to_string(),
            author: "Ann".to_string(),
            category: "rust".to_string(),
            ..Default::default()
        };
        let article = request.validate().unwrap();
        assert_eq!(article.title, "Hello");
        assert_eq!(article.status, ArticleStatus::Draft);

        let err = CreateArticleRequest {
            title: "Hello".to_string(),
            content: "Body".to_string(),
            author: "Ann".to_string(),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, "Category is required");
    }

    #[test]
    fn test_update_request_validation() {
        assert_eq!(
            UpdateArticleRequest::default().validate().unwrap_err(),
            "No fields to update"
        );

        let changes = UpdateArticleRequest {
            status: Some("published".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(changes.status, Some(ArticleStatus::Published));
        assert_eq!(changes.title, None);

        assert!(
            UpdateArticleRequest {
                status: Some("deleted".to_string()),
                ..Default::default()
            }
            .validate()
            .is_err()
        );
        assert!(
            UpdateArticleRequest {
                title: Some("   ".to_string()),
                ..Default::default()
            }
            .validate()
            .is_err()
        );
    }
}
