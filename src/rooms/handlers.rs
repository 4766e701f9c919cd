//! HTTP handlers for the room endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::authz;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthUser;
use crate::rooms::db::{self, JoinRequestInfo, MemberInfo, Room};
use crate::rooms::membership;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
}

/// POST /api/rooms - create a room owned by the caller.
pub async fn create_room(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateRoomRequest>,
) -> ApiResult<Json<Room>> {
    let room = membership::create_room(&app_state.db_pool, user.user_id, &request.name).await?;
    Ok(Json(room))
}

/// POST /api/rooms/join/{code} - file a join request.
pub async fn join_room(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(code): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    membership::request_join(
        &app_state.db_pool,
        &app_state.room_locks,
        user.user_id,
        &code,
    )
    .await?;

    Ok(Json(serde_json::json!({
        "message": "request sent to room owner"
    })))
}

/// GET /api/rooms - every room the caller is currently a member of.
pub async fn my_rooms(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<Room>>> {
    let rooms = db::rooms_for_member(&app_state.db_pool, user.user_id).await?;
    Ok(Json(rooms))
}

/// GET /api/rooms/{id}/members - member list, members only.
pub async fn room_members(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
) -> ApiResult<Json<Vec<MemberInfo>>> {
    let access = db::load_room_access(&app_state.db_pool, room_id)
        .await?
        .ok_or(ApiError::NotFound("room"))?;
    authz::view_room(user.user_id, &access).require()?;

    let members = db::list_members(&app_state.db_pool, room_id).await?;
    Ok(Json(members))
}

/// GET /api/rooms/{id}/requests - pending join requests, owner only.
pub async fn room_requests(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
) -> ApiResult<Json<Vec<JoinRequestInfo>>> {
    let requests = membership::list_requests(&app_state.db_pool, user.user_id, room_id).await?;
    Ok(Json(requests))
}

/// POST /api/rooms/{id}/requests/{request_id}/approve
pub async fn approve_request(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((room_id, request_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    membership::approve(
        &app_state.db_pool,
        &app_state.room_locks,
        user.user_id,
        room_id,
        request_id,
    )
    .await?;
    Ok(())
}

/// DELETE /api/rooms/{id}/requests/{request_id} - reject a join request.
pub async fn reject_request(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((room_id, request_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    membership::reject(
        &app_state.db_pool,
        &app_state.room_locks,
        user.user_id,
        room_id,
        request_id,
    )
    .await
}

/// DELETE /api/rooms/{id}/members/{user_id} - kick a member.
pub async fn kick_member(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((room_id, target_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    membership::kick(
        &app_state.db_pool,
        &app_state.room_locks,
        user.user_id,
        room_id,
        target_id,
    )
    .await
}

/// DELETE /api/rooms/{id} - delete a room and everything in it.
pub async fn delete_room(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
) -> ApiResult<()> {
    membership::delete_room(
        &app_state.db_pool,
        &app_state.room_locks,
        user.user_id,
        room_id,
    )
    .await?;

    // The room is gone; end every open subscription on its topic.
    app_state.room_topics.close(room_id);
    Ok(())
}
