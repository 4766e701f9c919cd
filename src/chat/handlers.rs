//! HTTP handlers for room chat.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::authz;
use crate::chat::db::{self, ChatMessage};
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthUser;
use crate::rooms::db::load_room_access;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
}

/// GET /api/rooms/{id}/messages - chat history, members only.
pub async fn chat_history(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    let access = load_room_access(&app_state.db_pool, room_id)
        .await?
        .ok_or(ApiError::NotFound("room"))?;
    authz::view_room(user.user_id, &access).require()?;

    let messages = db::messages_for_room(&app_state.db_pool, room_id).await?;
    Ok(Json(messages))
}

/// POST /api/rooms/{id}/messages - post a message and wake the room.
pub async fn post_message(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
    Json(request): Json<PostMessageRequest>,
) -> ApiResult<Json<ChatMessage>> {
    if request.content.trim().is_empty() {
        return Err(ApiError::bad_request("message cannot be empty"));
    }

    let access = load_room_access(&app_state.db_pool, room_id)
        .await?
        .ok_or(ApiError::NotFound("room"))?;
    authz::post_chat(user.user_id, &access).require()?;

    let message = db::store_message(
        &app_state.db_pool,
        room_id,
        user.user_id,
        &user.email,
        &request.content,
    )
    .await?;

    app_state.room_topics.invalidate(room_id);

    Ok(Json(message))
}
