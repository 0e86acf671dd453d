//! Article repository for database operations

use anyhow::Result;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::info;

use crate::models::{
    Article, ArticleChanges, ArticleFilter, ArticleOrder, ArticleStatus, NewArticle, Page,
};

const ARTICLE_COLUMNS: &str = "article_id, title, content, summary, author, author_phone, \
     cover, category, tag, status, view_count, like_count, comment_count, collect_count, \
     create_time, update_time";

/// Columns matched by content search
const SEARCHABLE_COLUMNS: [&str; 4] = ["title", "summary", "tag", "content"];

/// Who owns an article and whether it is still live
#[derive(Debug, Clone)]
pub struct ArticleOwnership {
    pub author_phone: String,
    pub deleted: bool,
}

/// Article repository for database operations
#[derive(Clone)]
pub struct ArticleRepository {
    pool: PgPool,
}

fn article_from_row(row: &PgRow) -> Result<Article, sqlx::Error> {
    Ok(Article {
        article_id: row.try_get("article_id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        summary: row.try_get("summary")?,
        author: row.try_get("author")?,
        author_phone: row.try_get("author_phone")?,
        cover: row.try_get("cover")?,
        category: row.try_get("category")?,
        tag: row.try_get("tag")?,
        status: row.try_get("status")?,
        view_count: row.try_get("view_count")?,
        like_count: row.try_get("like_count")?,
        comment_count: row.try_get("comment_count")?,
        collect_count: row.try_get("collect_count")?,
        create_time: row.try_get("create_time")?,
        update_time: row.try_get("update_time")?,
    })
}

/// WHERE clause shared by a listing and its count
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ArticleFilter) {
    builder
        .push(" WHERE status = ")
        .push_bind(filter.status.as_str());

    if let Some(category) = &filter.category {
        builder.push(" AND category = ").push_bind(category.clone());
    }

    if let Some(pattern) = &filter.pattern {
        builder.push(" AND (");
        for (i, column) in SEARCHABLE_COLUMNS.iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            builder
                .push(*column)
                .push(" ILIKE ")
                .push_bind(pattern.clone());
        }
        builder.push(")");
    }
}

fn order_clause(order: ArticleOrder) -> String {
    match order {
        ArticleOrder::By(field, direction) => format!(
            " ORDER BY {} {}, article_id {}",
            field.column(),
            direction.keyword(),
            direction.keyword()
        ),
        ArticleOrder::Hot => " ORDER BY (view_count * 0.7 + like_count * 0.3) DESC, \
             create_time DESC, article_id DESC"
            .to_string(),
        ArticleOrder::Latest => " ORDER BY create_time DESC, article_id DESC".to_string(),
    }
}

impl ArticleRepository {
    /// Create a new article repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of articles matching `filter`, plus the total match count
    pub async fn list(
        &self,
        filter: &ArticleFilter,
        order: ArticleOrder,
        page: Page,
    ) -> Result<(Vec<Article>, i64)> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles"
        ));
        push_filter(&mut query, filter);
        query
            .push(order_clause(order))
            .push(" LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = query.build().fetch_all(&self.pool).await?;
        let articles = rows
            .iter()
            .map(article_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM articles");
        push_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((articles, total))
    }

    /// Fetch a draft or published article, counting the view
    pub async fn get_for_view(&self, article_id: i64) -> Result<Option<Article>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE articles
            SET view_count = view_count + 1
            WHERE article_id = $1 AND status IN ('published', 'draft')
            RETURNING {ARTICLE_COLUMNS}
            "#
        ))
        .bind(article_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(article_from_row).transpose()?)
    }

    /// Insert an article owned by `author_phone` and return its id
    pub async fn create(&self, author_phone: &str, article: &NewArticle) -> Result<i64> {
        let article_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO articles
                (title, content, summary, author, author_phone, cover, category, tag, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING article_id
            "#,
        )
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.summary)
        .bind(&article.author)
        .bind(author_phone)
        .bind(&article.cover)
        .bind(&article.category)
        .bind(&article.tag)
        .bind(article.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        info!("Created article {} for {}", article_id, author_phone);
        Ok(article_id)
    }

    /// Owner and liveness of an article
    pub async fn ownership(&self, article_id: i64) -> Result<Option<ArticleOwnership>> {
        let row = sqlx::query("SELECT author_phone, status FROM articles WHERE article_id = $1")
            .bind(article_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let status: String = row.try_get("status")?;
                Ok(Some(ArticleOwnership {
                    author_phone: row.try_get("author_phone")?,
                    deleted: status == ArticleStatus::Deleted.as_str(),
                }))
            }
            None => Ok(None),
        }
    }

    /// Write the present fields of `changes`; `None` if the article is gone
    pub async fn update(&self, article_id: i64, changes: &ArticleChanges) -> Result<Option<Article>> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE articles SET ");
        let mut set = query.separated(", ");

        let text_fields = [
            ("title", &changes.title),
            ("content", &changes.content),
            ("summary", &changes.summary),
            ("author", &changes.author),
            ("cover", &changes.cover),
            ("category", &changes.category),
            ("tag", &changes.tag),
        ];
        for (column, value) in text_fields {
            if let Some(value) = value {
                set.push(column)
                    .push_unseparated(" = ")
                    .push_bind_unseparated(value.clone());
            }
        }
        if let Some(status) = changes.status {
            set.push("status = ").push_bind_unseparated(status.as_str());
        }
        set.push("update_time = NOW()");

        query
            .push(" WHERE article_id = ")
            .push_bind(article_id)
            .push(" AND status <> 'deleted' RETURNING ")
            .push(ARTICLE_COLUMNS);

        let row = query.build().fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(article_from_row).transpose()?)
    }

    /// Mark an article deleted; false if it was missing or already deleted
    pub async fn soft_delete(&self, article_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE articles
            SET status = 'deleted', update_time = NOW()
            WHERE article_id = $1 AND status <> 'deleted'
            "#,
        )
        .bind(article_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
