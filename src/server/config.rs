//! Server configuration.
//!
//! Configuration comes from environment variables (optionally via `.env`):
//!
//! - `DATABASE_URL` - SQLite database, defaults to `sqlite:thoughtwall.db`
//! - `SERVER_PORT`  - listen port, defaults to 3000
//! - `JWT_SECRET`   - HS256 signing secret
//! - `FRONTEND_URL` - allowed CORS origin, defaults to `http://localhost:5173`

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Embedded schema migrations, also run by the integration tests.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

const DEFAULT_DATABASE_URL: &str = "sqlite:thoughtwall.db";

/// Connect to the Directory database and bring the schema up to date.
pub async fn load_database() -> Result<SqlitePool, sqlx::Error> {
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    tracing::info!("connecting to database at {database_url}");

    let options = SqliteConnectOptions::from_str(&database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect_with(options)
        .await?;

    tracing::info!("running database migrations");
    MIGRATOR.run(&pool).await?;

    Ok(pool)
}

/// Port the HTTP listener binds to.
pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(3000)
}

/// Origin allowed by the CORS layer.
pub fn frontend_url() -> String {
    std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string())
}
