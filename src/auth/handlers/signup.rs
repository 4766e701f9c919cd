//! Signup handler for POST /api/auth/signup.
//!
//! Registration flow:
//! 1. Validate email shape and password length
//! 2. Hash the password with bcrypt
//! 3. Create the user (unique email enforced by the Directory)
//! 4. Issue a JWT so the client is authenticated immediately

use axum::{extract::State, Json};
use bcrypt::{hash, DEFAULT_COST};
use sqlx::SqlitePool;

use crate::auth::handlers::types::{AuthResponse, SignupRequest, UserResponse};
use crate::auth::sessions::create_token;
use crate::auth::users::create_user;
use crate::error::{ApiError, ApiResult};

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

pub async fn signup(
    State(pool): State<SqlitePool>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = request.email.trim();

    if !email.contains('@') {
        return Err(ApiError::bad_request("invalid email format"));
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = hash(&request.password, DEFAULT_COST)
        .map_err(|err| ApiError::internal(format!("password hashing failed: {err}")))?;

    // create_user maps a duplicate email to Conflict, so a racing signup for
    // the same address cannot slip through a check-then-insert gap.
    let user = create_user(&pool, email, &password_hash).await?;

    let token = create_token(user.id, &user.email)
        .map_err(|err| ApiError::internal(format!("token creation failed: {err}")))?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(Json(AuthResponse {
        token,
        user: UserResponse {
            id: user.id.to_string(),
            email: user.email,
        },
    }))
}
