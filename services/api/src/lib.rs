//! Inkwell content service
//!
//! Articles, likes and favorites, reports, per-user search history and
//! content search behind one axum router. The binary in `main.rs` wires
//! the repositories to PostgreSQL and Redis and serves [`routes::create_router`].

pub mod error;
pub mod interaction;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod search_history;
pub mod state;
