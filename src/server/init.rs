//! Server initialization.
//!
//! Assembles the application: state container, then the router. The pool is
//! injected so tests can run the full router over an in-memory database.

use axum::Router;
use sqlx::SqlitePool;

use crate::routes::router::create_router;
use crate::server::config::load_database;
use crate::server::state::AppState;

/// Build the application around an existing Directory pool.
pub fn build_app(db_pool: SqlitePool) -> Router {
    let state = AppState::new(db_pool);
    create_router(state)
}

/// Connect to the configured database and build the application.
pub async fn create_app() -> Result<Router, sqlx::Error> {
    tracing::info!("initializing thoughtwall server");
    let db_pool = load_database().await?;
    Ok(build_app(db_pool))
}
