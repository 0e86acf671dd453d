//! Integration tests for the article and interaction repositories
//!
//! Each test seeds its own user and a category named after it, so the
//! tests can share one database and run in parallel. They need a live
//! PostgreSQL, so run them with `cargo test -- --ignored`.

use api::{
    interaction::{InteractionAction, InteractionError, InteractionKind},
    models::{
        ArticleFilter, ArticleOrder, ArticlePage, ArticleStatus, NewArticle, Page,
        article::{SortDirection, SortField},
    },
    repositories::{ArticleRepository, InteractionRepository},
};
use chrono::Utc;
use common::database::{DatabaseConfig, init_pool, run_migrations};
use sqlx::PgPool;
use std::collections::HashSet;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

async fn migrated_pool() -> TestResult<PgPool> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Insert a user with a phone unlikely to collide with earlier runs
async fn seed_user(pool: &PgPool, tag: u8) -> TestResult<String> {
    let phone = format!("19{tag}{:07}", Utc::now().timestamp_micros() % 10_000_000);
    sqlx::query(
        "INSERT INTO users (phone, username) VALUES ($1, $2) ON CONFLICT (phone) DO NOTHING",
    )
    .bind(&phone)
    .bind(format!("user_{phone}"))
    .execute(pool)
    .await?;
    Ok(phone)
}

fn new_article(title: &str, category: &str, status: ArticleStatus) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        content: format!("{title} body"),
        summary: String::new(),
        author: "Integration".to_string(),
        cover: String::new(),
        category: category.to_string(),
        tag: String::new(),
        status,
    }
}

async fn interaction_rows(pool: &PgPool, article_id: i64, phone: &str) -> TestResult<i64> {
    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM userarticles WHERE article_id = $1 AND phone = $2",
    )
    .bind(article_id)
    .bind(phone)
    .fetch_one(pool)
    .await?;
    Ok(rows)
}

#[tokio::test]
#[ignore = "requires running PostgreSQL"]
async fn test_toggle_keeps_rows_and_counters_in_step() -> TestResult {
    let pool = migrated_pool().await?;
    let phone = seed_user(&pool, 1).await?;
    let articles = ArticleRepository::new(pool.clone());
    let interactions = InteractionRepository::new(pool.clone());

    let article_id = articles
        .create(&phone, &new_article("toggle", &format!("it-{phone}"), ArticleStatus::Published))
        .await?;

    let liked = interactions
        .toggle(article_id, &phone, InteractionKind::Like, InteractionAction::Apply)
        .await?;
    assert_eq!((liked.count, liked.active), (1, true));
    assert_eq!(interaction_rows(&pool, article_id, &phone).await?, 1);

    let again = interactions
        .toggle(article_id, &phone, InteractionKind::Like, InteractionAction::Apply)
        .await;
    assert!(matches!(again, Err(InteractionError::AlreadyDone(_))));

    let favorited = interactions
        .toggle(article_id, &phone, InteractionKind::Favorite, InteractionAction::Apply)
        .await?;
    assert_eq!((favorited.count, favorited.active), (1, true));

    // the row survives while the favorite is still set
    let unliked = interactions
        .toggle(article_id, &phone, InteractionKind::Like, InteractionAction::Revoke)
        .await?;
    assert_eq!((unliked.count, unliked.active), (0, false));
    assert_eq!(interaction_rows(&pool, article_id, &phone).await?, 1);

    let unfavorited = interactions
        .toggle(article_id, &phone, InteractionKind::Favorite, InteractionAction::Revoke)
        .await?;
    assert_eq!((unfavorited.count, unfavorited.active), (0, false));
    assert_eq!(interaction_rows(&pool, article_id, &phone).await?, 0);

    let never_liked = interactions
        .toggle(article_id, &phone, InteractionKind::Like, InteractionAction::Revoke)
        .await;
    assert!(matches!(never_liked, Err(InteractionError::NotDone(_))));

    let status = interactions
        .status(article_id, Some(phone.as_str()))
        .await?
        .expect("article is live");
    assert!(!status.is_like && !status.is_collect);
    assert_eq!((status.like_count, status.collect_count), (0, 0));

    Ok(())
}

#[tokio::test]
#[ignore = "requires running PostgreSQL"]
async fn test_revoke_never_drives_counter_negative() -> TestResult {
    let pool = migrated_pool().await?;
    let phone = seed_user(&pool, 2).await?;
    let articles = ArticleRepository::new(pool.clone());
    let interactions = InteractionRepository::new(pool.clone());

    let article_id = articles
        .create(&phone, &new_article("floor", &format!("it-{phone}"), ArticleStatus::Published))
        .await?;
    interactions
        .toggle(article_id, &phone, InteractionKind::Like, InteractionAction::Apply)
        .await?;

    // counter drifted below the rows, e.g. after a manual fix-up
    sqlx::query("UPDATE articles SET like_count = 0 WHERE article_id = $1")
        .bind(article_id)
        .execute(&pool)
        .await?;

    let unliked = interactions
        .toggle(article_id, &phone, InteractionKind::Like, InteractionAction::Revoke)
        .await?;
    assert_eq!((unliked.count, unliked.active), (0, false));
    assert_eq!(interaction_rows(&pool, article_id, &phone).await?, 0);

    Ok(())
}

#[tokio::test]
#[ignore = "requires running PostgreSQL"]
async fn test_toggle_on_deleted_article_is_not_found() -> TestResult {
    let pool = migrated_pool().await?;
    let phone = seed_user(&pool, 3).await?;
    let articles = ArticleRepository::new(pool.clone());
    let interactions = InteractionRepository::new(pool.clone());

    let article_id = articles
        .create(&phone, &new_article("gone", &format!("it-{phone}"), ArticleStatus::Published))
        .await?;
    assert!(articles.soft_delete(article_id).await?);

    let result = interactions
        .toggle(article_id, &phone, InteractionKind::Favorite, InteractionAction::Apply)
        .await;
    assert!(matches!(result, Err(InteractionError::ArticleNotFound)));
    assert!(interactions.status(article_id, Some(phone.as_str())).await?.is_none());

    Ok(())
}

#[tokio::test]
#[ignore = "requires running PostgreSQL"]
async fn test_list_second_page_of_twenty_five() -> TestResult {
    let pool = migrated_pool().await?;
    let phone = seed_user(&pool, 4).await?;
    let articles = ArticleRepository::new(pool.clone());
    let category = format!("it-{phone}");

    for i in 0..25 {
        articles
            .create(&phone, &new_article(&format!("post {i}"), &category, ArticleStatus::Published))
            .await?;
    }
    articles
        .create(&phone, &new_article("unfinished", &category, ArticleStatus::Draft))
        .await?;

    let filter = ArticleFilter::new(ArticleStatus::Published, Some(category.as_str()));
    let order = ArticleOrder::By(SortField::CreateTime, SortDirection::Desc);

    let mut seen = HashSet::new();
    for (page_number, expected_rows) in [(1, 10), (2, 10), (3, 5)] {
        let page = Page::new(Some(page_number), Some(10));
        let (list, total) = articles.list(&filter, order, page).await?;
        assert_eq!(list.len(), expected_rows, "page {page_number}");
        assert!(list.iter().all(|a| a.status == "published"));
        seen.extend(list.iter().map(|a| a.article_id));

        if page_number == 2 {
            let page = ArticlePage::new(list, total, page);
            assert_eq!(page.total, 25);
            assert_eq!(page.total_pages, 3);
        }
    }
    assert_eq!(seen.len(), 25);

    Ok(())
}

#[tokio::test]
#[ignore = "requires running PostgreSQL"]
async fn test_view_counts_and_soft_delete_keeps_row() -> TestResult {
    let pool = migrated_pool().await?;
    let phone = seed_user(&pool, 5).await?;
    let articles = ArticleRepository::new(pool.clone());
    let category = format!("it-{phone}");

    let article_id = articles
        .create(&phone, &new_article("viewed", &category, ArticleStatus::Draft))
        .await?;

    let first = articles.get_for_view(article_id).await?.expect("draft is viewable");
    assert_eq!(first.view_count, 1);
    let second = articles.get_for_view(article_id).await?.expect("draft is viewable");
    assert_eq!(second.view_count, 2);

    assert!(articles.soft_delete(article_id).await?);
    assert!(!articles.soft_delete(article_id).await?);
    assert!(articles.get_for_view(article_id).await?.is_none());

    let ownership = articles.ownership(article_id).await?.expect("row is kept");
    assert_eq!(ownership.author_phone, phone);
    assert!(ownership.deleted);

    let (status, view_count): (String, i64) =
        sqlx::query_as("SELECT status, view_count FROM articles WHERE article_id = $1")
            .bind(article_id)
            .fetch_one(&pool)
            .await?;
    assert_eq!(status, "deleted");
    assert_eq!(view_count, 2);

    let (list, total) = articles
        .list(
            &ArticleFilter::new(ArticleStatus::Draft, Some(category.as_str())),
            ArticleOrder::Latest,
            Page::new(None, None),
        )
        .await?;
    assert!(list.is_empty());
    assert_eq!(total, 0);

    Ok(())
}
