//! User rows and database operations.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::db::parse_id;
use crate::error::{ApiError, ApiResult};

/// A user account.
///
/// The password hash never leaves the server; it is skipped on
/// serialization.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn from_row(row: &SqliteRow) -> ApiResult<Self> {
        Ok(Self {
            id: parse_id(row.get("id"))?,
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            created_at: row.get("created_at"),
        })
    }
}

/// Create a new user. The email must be unique; a racing duplicate insert
/// surfaces as `Conflict`.
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
) -> ApiResult<User> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(email)
    .bind(password_hash)
    .bind(now)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        }),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(ApiError::Conflict("email already taken"))
        }
        Err(err) => Err(err.into()),
    }
}

/// Get a user by email. Returns `None` if not found.
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> ApiResult<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, email, password_hash, created_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(User::from_row).transpose()
}

/// Get a user by id. Returns `None` if not found.
pub async fn get_user_by_id(pool: &SqlitePool, id: Uuid) -> ApiResult<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, email, password_hash, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(User::from_row).transpose()
}
