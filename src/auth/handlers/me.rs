//! Current-user handler for GET /api/auth/me.

use axum::{extract::State, Json};
use sqlx::SqlitePool;

use crate::auth::handlers::types::UserResponse;
use crate::auth::users::get_user_by_id;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthUser;

pub async fn me(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let user = get_user_by_id(&pool, user.user_id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    Ok(Json(UserResponse {
        id: user.id.to_string(),
        email: user.email,
    }))
}
