//! Common library for the Inkwell services
//!
//! This crate provides the plumbing shared by the auth and api services:
//! PostgreSQL pooling and migrations, the Redis handle, JWT signing and
//! validation, the JSON response envelope, settings and tracing bootstrap.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     println!("Database health check: {}", health_check(&pool).await?);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod database;
pub mod error;
pub mod jwt;
pub mod response;
pub mod settings;
pub mod telemetry;
