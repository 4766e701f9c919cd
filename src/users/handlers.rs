//! HTTP handlers for the user profile and account deletion.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::cleanup;
use crate::error::ApiResult;
use crate::middleware::auth::AuthUser;
use crate::rooms::db::{rooms_for_member, rooms_owned_by, Room};
use crate::server::state::AppState;
use crate::thoughts::db::{assigned_thoughts, AssignedThought};

/// GET /api/users/profile response.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub email: String,
    pub owned_rooms: Vec<Room>,
    /// Every room the user is a member of - the derived reverse index.
    pub joined_rooms: Vec<Room>,
    pub assigned_thoughts: Vec<AssignedThought>,
}

/// GET /api/users/profile - the caller's rooms and assigned work.
pub async fn profile(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let owned_rooms = rooms_owned_by(&app_state.db_pool, user.user_id).await?;
    let joined_rooms = rooms_for_member(&app_state.db_pool, user.user_id).await?;
    let assigned = assigned_thoughts(&app_state.db_pool, user.user_id).await?;

    Ok(Json(UserProfile {
        email: user.email,
        owned_rooms,
        joined_rooms,
        assigned_thoughts: assigned,
    }))
}

/// DELETE /api/users/me - delete the account with its full cascade.
pub async fn delete_account(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<()> {
    let cascade = cleanup::delete_user(&app_state.db_pool, user.user_id).await?;

    // Owned rooms are gone: end their subscriptions. Surviving rooms the
    // user touched get an invalidation so members re-fetch.
    for room_id in cascade.deleted_rooms {
        app_state.room_topics.close(room_id);
        app_state.room_locks.forget(room_id);
    }
    for room_id in cascade.touched_rooms {
        app_state.room_topics.invalidate(room_id);
    }

    Ok(())
}
