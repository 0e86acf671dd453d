use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
    jwt::{JwtConfig, JwtService},
    settings::ServerSettings,
    telemetry::init_tracing,
};
use tokio::net::TcpListener;

use api::{
    repositories::{
        ArticleRepository, InteractionRepository, ReportRepository, SearchRecordRepository,
    },
    routes,
    search_history::SearchHistoryService,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    // Redis is optional at start-up; search history degrades to Postgres
    let redis_pool = RedisPool::new(&RedisConfig::from_env()?)?;
    if !redis_pool.health_check().await? {
        warn!("Redis is unreachable, search history will be served from the database");
    }

    let jwt_service = JwtService::new(&JwtConfig::from_env()?);

    // Initialize repositories
    let search_history = SearchHistoryService::new(
        Arc::new(redis_pool),
        Arc::new(SearchRecordRepository::new(pool.clone())),
    );

    let app_state = AppState {
        article_repository: ArticleRepository::new(pool.clone()),
        interaction_repository: InteractionRepository::new(pool.clone()),
        report_repository: ReportRepository::new(pool),
        search_history,
        jwt_service,
    };

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let settings = ServerSettings::load("api", 3001)?;
    let addr = settings.addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!("API service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
