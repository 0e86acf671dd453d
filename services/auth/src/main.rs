use anyhow::Result;
use tracing::info;

mod captcha;
mod error;
mod middleware;
mod models;
mod password;
mod rate_limiter;
mod repositories;
mod routes;
mod validation;

use common::{
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
    jwt::{JwtConfig, JwtService},
    settings::ServerSettings,
    telemetry::init_tracing,
};
use tokio::net::TcpListener;

use crate::{
    captcha::{CaptchaSweeper, DEFAULT_SWEEP_SCHEDULE},
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::{CaptchaRepository, UserRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_repository: UserRepository,
    pub captcha_repository: CaptchaRepository,
    pub jwt_service: JwtService,
    pub captcha_limiter: RateLimiter,
    pub login_limiter: RateLimiter,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting authentication service");

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

    let jwt_service = JwtService::new(&JwtConfig::from_env()?);

    let user_repository = UserRepository::new(pool.clone());
    let captcha_repository = CaptchaRepository::new(pool);
    let captcha_limiter = RateLimiter::new(RateLimiterConfig::captcha());
    let login_limiter = RateLimiter::new(RateLimiterConfig::login());

    let schedule = std::env::var("CAPTCHA_SWEEP_SCHEDULE")
        .unwrap_or_else(|_| DEFAULT_SWEEP_SCHEDULE.to_string());
    let sweeper = CaptchaSweeper::new(
        captcha_repository.clone(),
        vec![captcha_limiter.clone(), login_limiter.clone()],
    );
    let mut scheduler = sweeper.start(&schedule).await?;

    let app_state = AppState {
        user_repository,
        captcha_repository,
        jwt_service,
        captcha_limiter,
        login_limiter,
    };

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let settings = ServerSettings::load("auth", 3000)?;
    let addr = settings.addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Authentication service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    scheduler.shutdown().await?;

    Ok(())
}
