//! API models for request and response payloads

pub mod article;
pub mod interaction;
pub mod search;

pub use article::{
    Article, ArticleChanges, ArticleFilter, ArticleOrder, ArticlePage, ArticleStatus, NewArticle,
    Page,
};
pub use interaction::InteractionStatus;
pub use search::StoredKeyword;
