//! HTTP handlers for the thought endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authz::{self, RoomAccess, ThoughtAccess};
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthUser;
use crate::rooms::db::load_room_access;
use crate::server::state::AppState;
use crate::thoughts::db::{self, Thought};
use crate::thoughts::scope::{
    apply_update, normalize_tag, validate_content, AssignmentChange, ListScope, NewThoughtRequest,
    ThoughtUpdateRequest,
};

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

/// GET /api/thoughts query parameters.
#[derive(Debug, Deserialize)]
pub struct ThoughtListQuery {
    pub room_id: Option<Uuid>,
    pub tag: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

/// One page of a wall.
#[derive(Debug, Serialize)]
pub struct ThoughtPage {
    pub items: Vec<Thought>,
    pub page: u32,
    pub size: u32,
    pub total_items: i64,
    pub total_pages: i64,
}

/// GET /api/thoughts - list the caller's personal wall, or a room's wall.
pub async fn list_thoughts(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<ThoughtListQuery>,
) -> ApiResult<Json<ThoughtPage>> {
    let scope = match query.room_id {
        Some(room_id) => {
            let access = load_room_access(&app_state.db_pool, room_id)
                .await?
                .ok_or(ApiError::NotFound("room"))?;
            authz::view_room(user.user_id, &access).require()?;
            ListScope::Room(room_id)
        }
        None => ListScope::Personal(user.user_id),
    };

    // "All" (and empty) means no tag filter - a client-side sentinel.
    let tag = query
        .tag
        .as_deref()
        .map(str::trim)
        .filter(|tag| !tag.is_empty() && *tag != "All");

    let page = query.page.unwrap_or(0);
    let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let (items, total_items) = db::list_thoughts(&app_state.db_pool, scope, tag, page, size).await?;
    let total_pages = (total_items + i64::from(size) - 1) / i64::from(size);

    Ok(Json(ThoughtPage {
        items,
        page,
        size,
        total_items,
        total_pages,
    }))
}

/// POST /api/thoughts - post to the personal wall, or into a room.
pub async fn create_thought(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<NewThoughtRequest>,
) -> ApiResult<Json<Thought>> {
    validate_content(&request.content)?;
    let tag = normalize_tag(request.tag.as_deref())?;

    // Room scope is fixed here, at creation: membership is checked now and
    // the thought never migrates afterwards.
    if let Some(room_id) = request.room_id {
        let access = load_room_access(&app_state.db_pool, room_id)
            .await?
            .ok_or(ApiError::NotFound("room"))?;
        authz::create_room_thought(user.user_id, &access).require()?;
    }

    let thought = Thought {
        id: Uuid::new_v4(),
        content: request.content,
        tag,
        pinned: false,
        completed: false,
        due_date: request.due_date,
        created_at: Utc::now(),
        user_id: user.user_id,
        room_id: request.room_id,
        assigned_to: None,
    };
    db::insert_thought(&app_state.db_pool, &thought).await?;

    if let Some(room_id) = thought.room_id {
        app_state.room_topics.invalidate(room_id);
    }

    Ok(Json(thought))
}

/// GET /api/thoughts/{id} - fetch a single thought.
///
/// The author can always fetch their own thought, even after being kicked
/// from the room it lives in.
pub async fn get_thought(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(thought_id): Path<Uuid>,
) -> ApiResult<Json<Thought>> {
    let thought = db::get_thought(&app_state.db_pool, thought_id)
        .await?
        .ok_or(ApiError::NotFound("thought"))?;

    let room_access = match thought.room_id {
        Some(room_id) => load_room_access(&app_state.db_pool, room_id).await?,
        None => None,
    };
    authz::view_thought(user.user_id, &thought_access(&thought, room_access.as_ref()))
        .require()?;

    Ok(Json(thought))
}

/// PUT /api/thoughts/{id} - partial update.
pub async fn update_thought(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(thought_id): Path<Uuid>,
    Json(request): Json<ThoughtUpdateRequest>,
) -> ApiResult<Json<Thought>> {
    let mut thought = db::get_thought(&app_state.db_pool, thought_id)
        .await?
        .ok_or(ApiError::NotFound("thought"))?;

    let room_access = match thought.room_id {
        Some(room_id) => load_room_access(&app_state.db_pool, room_id).await?,
        None => None,
    };
    authz::update_thought(user.user_id, &thought_access(&thought, room_access.as_ref()))
        .require()?;

    apply_update(&mut thought, &request)?;

    match request.assignment_change() {
        AssignmentChange::Keep => {}
        AssignmentChange::Clear => thought.assigned_to = None,
        AssignmentChange::Assign(target) => {
            let Some(access) = room_access.as_ref() else {
                return Err(ApiError::bad_request("cannot assign a personal thought"));
            };
            if !access.is_member(target) {
                return Err(ApiError::bad_request("assignee must be a room member"));
            }
            thought.assigned_to = Some(target);
        }
    }

    db::update_thought(&app_state.db_pool, &thought).await?;

    if let Some(room_id) = thought.room_id {
        app_state.room_topics.invalidate(room_id);
    }

    Ok(Json(thought))
}

/// DELETE /api/thoughts/{id} - author only.
pub async fn delete_thought(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(thought_id): Path<Uuid>,
) -> ApiResult<()> {
    let thought = db::get_thought(&app_state.db_pool, thought_id)
        .await?
        .ok_or(ApiError::NotFound("thought"))?;

    let room_access = match thought.room_id {
        Some(room_id) => load_room_access(&app_state.db_pool, room_id).await?,
        None => None,
    };
    authz::delete_thought(user.user_id, &thought_access(&thought, room_access.as_ref()))
        .require()?;

    db::delete_thought(&app_state.db_pool, thought.id).await?;

    if let Some(room_id) = thought.room_id {
        app_state.room_topics.invalidate(room_id);
    }

    Ok(())
}

/// PUT /api/thoughts/tags/migrate query parameters.
#[derive(Debug, Deserialize)]
pub struct TagMigrateQuery {
    pub old_tag: String,
    pub new_tag: String,
}

/// PUT /api/thoughts/tags/migrate - rename a tag across the caller's own
/// thoughts.
pub async fn migrate_tags(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<TagMigrateQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let new_tag = normalize_tag(Some(query.new_tag.as_str()))?;
    let updated =
        db::migrate_tag(&app_state.db_pool, user.user_id, &query.old_tag, &new_tag).await?;

    Ok(Json(serde_json::json!({ "updated": updated })))
}

fn thought_access<'a>(thought: &Thought, room: Option<&'a RoomAccess>) -> ThoughtAccess<'a> {
    ThoughtAccess {
        author_id: thought.user_id,
        room,
    }
}
