//! Login handler for POST /api/auth/login.

use axum::{extract::State, Json};
use sqlx::SqlitePool;

use crate::auth::handlers::types::{AuthResponse, LoginRequest, UserResponse};
use crate::auth::sessions::create_token;
use crate::auth::users::get_user_by_email;
use crate::error::{ApiError, ApiResult};

/// Verify credentials and issue a token.
///
/// Unknown email and wrong password return the same `Unauthenticated` error
/// so the endpoint does not reveal which addresses have accounts.
pub async fn login(
    State(pool): State<SqlitePool>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = get_user_by_email(&pool, request.email.trim())
        .await?
        .ok_or(ApiError::Unauthenticated("invalid credentials"))?;

    let password_matches = bcrypt::verify(&request.password, &user.password_hash)
        .map_err(|err| ApiError::internal(format!("password verification failed: {err}")))?;
    if !password_matches {
        return Err(ApiError::Unauthenticated("invalid credentials"));
    }

    let token = create_token(user.id, &user.email)
        .map_err(|err| ApiError::internal(format!("token creation failed: {err}")))?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(AuthResponse {
        token,
        user: UserResponse {
            id: user.id.to_string(),
            email: user.email,
        },
    }))
}
