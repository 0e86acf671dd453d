//! Integration tests for the infrastructure components
//!
//! These tests verify that the PostgreSQL database and Redis cache are
//! reachable, that the embedded migrations apply, and that the sorted-set
//! helpers behave the way the search history relies on. They need live
//! services, so run them with `cargo test -- --ignored`.

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires running PostgreSQL"]
async fn test_database_migrations_apply() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");
    run_migrations(&pool).await?;

    let row = sqlx::query(
        "SELECT COUNT(*) AS tables FROM information_schema.tables \
         WHERE table_name IN ('users', 'articles', 'captchas', 'userarticles', 'searchrecords', 'article_reports')",
    )
    .fetch_one(&pool)
    .await?;

    let tables: i64 = row.get("tables");
    assert_eq!(tables, 6, "expected every Inkwell table to exist");

    Ok(())
}

#[tokio::test]
#[ignore = "requires running Redis"]
async fn test_sorted_set_cap_and_order() -> Result<(), Box<dyn std::error::Error>> {
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config)?;

    assert!(
        redis_pool.health_check().await?,
        "Redis health check failed"
    );

    let key = "integration:sorted:set";
    redis_pool.delete(key).await?;

    for i in 0..5 {
        redis_pool
            .add_scored_capped(key, &[(f64::from(i), format!("k{i}"))], 3, 60)
            .await?;
    }

    let members = redis_pool.newest_members(key, 10).await?;
    assert_eq!(members, vec!["k4", "k3", "k2"]);

    redis_pool.remove_member(key, "k3").await?;
    let members = redis_pool.newest_members(key, 10).await?;
    assert_eq!(members, vec!["k4", "k2"]);

    redis_pool.delete(key).await?;
    assert!(redis_pool.newest_members(key, 10).await?.is_empty());

    Ok(())
}
