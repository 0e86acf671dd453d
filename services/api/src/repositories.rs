//! Repositories for database operations

pub mod article;
pub mod interaction;
pub mod report;
pub mod search_record;

pub use article::ArticleRepository;
pub use interaction::InteractionRepository;
pub use report::ReportRepository;
pub use search_record::SearchRecordRepository;
