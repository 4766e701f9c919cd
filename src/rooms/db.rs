//! Database operations for rooms, membership, and join requests.
//!
//! Membership is one-directional: a room owns its member-id set in the
//! `room_members` table. "Rooms I joined" is the derived reverse index,
//! recomputed by query.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::authz::RoomAccess;
use crate::db::parse_id;
use crate::error::{ApiError, ApiResult};

/// A room row.
#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    /// Immutable join code, unique among live rooms.
    pub code: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub(crate) fn from_row(row: &SqliteRow) -> ApiResult<Self> {
        Ok(Self {
            id: parse_id(row.get("id"))?,
            name: row.get("name"),
            code: row.get("code"),
            owner_id: parse_id(row.get("owner_id"))?,
            created_at: row.get("created_at"),
        })
    }
}

/// A pending join request.
#[derive(Debug, Clone, Serialize)]
pub struct JoinRequest {
    pub id: Uuid,
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub requested_at: DateTime<Utc>,
}

impl JoinRequest {
    fn from_row(row: &SqliteRow) -> ApiResult<Self> {
        Ok(Self {
            id: parse_id(row.get("id"))?,
            room_id: parse_id(row.get("room_id"))?,
            user_id: parse_id(row.get("user_id"))?,
            requested_at: row.get("requested_at"),
        })
    }
}

/// Join request as shown to the room owner.
#[derive(Debug, Serialize)]
pub struct JoinRequestInfo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub requested_at: DateTime<Utc>,
}

/// Room member as shown to other members.
#[derive(Debug, Serialize)]
pub struct MemberInfo {
    pub id: Uuid,
    pub email: String,
}

/// Insert a room and its owner membership row in one transaction.
///
/// Returns `Ok(None)` when the code is already taken (the caller retries
/// with a fresh one); the UNIQUE index is the reservation authority, there
/// is no separate existence check to race against.
pub async fn try_insert_room(pool: &SqlitePool, room: &Room) -> ApiResult<Option<()>> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO rooms (id, name, code, owner_id, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(room.id.to_string())
    .bind(&room.name)
    .bind(&room.code)
    .bind(room.owner_id.to_string())
    .bind(room.created_at)
    .execute(&mut *tx)
    .await;

    match inserted {
        Ok(_) => {}
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    }

    sqlx::query(
        r#"
        INSERT INTO room_members (room_id, user_id, joined_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(room.id.to_string())
    .bind(room.owner_id.to_string())
    .bind(room.created_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(()))
}

/// Get a room by id. Returns `None` if not found.
pub async fn get_room(pool: &SqlitePool, room_id: Uuid) -> ApiResult<Option<Room>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, code, owner_id, created_at
        FROM rooms
        WHERE id = ?
        "#,
    )
    .bind(room_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(Room::from_row).transpose()
}

/// Get a room by join code. Returns `None` if no live room holds the code.
pub async fn get_room_by_code(pool: &SqlitePool, code: &str) -> ApiResult<Option<Room>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, code, owner_id, created_at
        FROM rooms
        WHERE code = ?
        "#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(Room::from_row).transpose()
}

/// Load the authorization snapshot for a room: owner plus member-id set.
pub async fn load_room_access(pool: &SqlitePool, room_id: Uuid) -> ApiResult<Option<RoomAccess>> {
    let Some(room) = get_room(pool, room_id).await? else {
        return Ok(None);
    };

    let rows = sqlx::query(
        r#"
        SELECT user_id FROM room_members WHERE room_id = ?
        "#,
    )
    .bind(room_id.to_string())
    .fetch_all(pool)
    .await?;

    let mut member_ids = HashSet::with_capacity(rows.len());
    for row in &rows {
        member_ids.insert(parse_id(row.get("user_id"))?);
    }

    Ok(Some(RoomAccess {
        room_id: room.id,
        owner_id: room.owner_id,
        member_ids,
    }))
}

/// Room members with their emails, for the member list endpoint.
pub async fn list_members(pool: &SqlitePool, room_id: Uuid) -> ApiResult<Vec<MemberInfo>> {
    let rows = sqlx::query(
        r#"
        SELECT u.id, u.email
        FROM room_members m
        INNER JOIN users u ON u.id = m.user_id
        WHERE m.room_id = ?
        ORDER BY u.email ASC
        "#,
    )
    .bind(room_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(MemberInfo {
                id: parse_id(row.get("id"))?,
                email: row.get("email"),
            })
        })
        .collect()
}

/// Remove a member row. Returns whether a row was actually removed.
pub async fn remove_member(pool: &SqlitePool, room_id: Uuid, user_id: Uuid) -> ApiResult<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM room_members WHERE room_id = ? AND user_id = ?
        "#,
    )
    .bind(room_id.to_string())
    .bind(user_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Derived reverse index: every room the user is currently a member of
/// (owned rooms included, since the owner is always a member).
pub async fn rooms_for_member(pool: &SqlitePool, user_id: Uuid) -> ApiResult<Vec<Room>> {
    let rows = sqlx::query(
        r#"
        SELECT r.id, r.name, r.code, r.owner_id, r.created_at
        FROM rooms r
        INNER JOIN room_members m ON m.room_id = r.id
        WHERE m.user_id = ?
        ORDER BY r.created_at ASC
        "#,
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(Room::from_row).collect()
}

/// Rooms owned by the user.
pub async fn rooms_owned_by(pool: &SqlitePool, user_id: Uuid) -> ApiResult<Vec<Room>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, code, owner_id, created_at
        FROM rooms
        WHERE owner_id = ?
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(Room::from_row).collect()
}

/// Create a join request. A racing duplicate for the same (room, user) pair
/// trips the UNIQUE constraint and surfaces as `Conflict`.
pub async fn insert_join_request(
    pool: &SqlitePool,
    room_id: Uuid,
    user_id: Uuid,
) -> ApiResult<JoinRequest> {
    let request = JoinRequest {
        id: Uuid::new_v4(),
        room_id,
        user_id,
        requested_at: Utc::now(),
    };

    let result = sqlx::query(
        r#"
        INSERT INTO room_join_requests (id, room_id, user_id, requested_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(request.id.to_string())
    .bind(room_id.to_string())
    .bind(user_id.to_string())
    .bind(request.requested_at)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(request),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(ApiError::Conflict("request already pending"))
        }
        Err(err) => Err(err.into()),
    }
}

/// Whether the user has a pending request for the room.
pub async fn has_pending_request(
    pool: &SqlitePool,
    room_id: Uuid,
    user_id: Uuid,
) -> ApiResult<bool> {
    let row = sqlx::query(
        r#"
        SELECT 1 FROM room_join_requests WHERE room_id = ? AND user_id = ?
        "#,
    )
    .bind(room_id.to_string())
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// Get a join request by id. Returns `None` if not found.
pub async fn get_join_request(
    pool: &SqlitePool,
    request_id: Uuid,
) -> ApiResult<Option<JoinRequest>> {
    let row = sqlx::query(
        r#"
        SELECT id, room_id, user_id, requested_at
        FROM room_join_requests
        WHERE id = ?
        "#,
    )
    .bind(request_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(JoinRequest::from_row).transpose()
}

/// Pending requests for a room, oldest first, with requester emails.
pub async fn join_requests_for_room(
    pool: &SqlitePool,
    room_id: Uuid,
) -> ApiResult<Vec<JoinRequestInfo>> {
    let rows = sqlx::query(
        r#"
        SELECT q.id, q.user_id, u.email AS user_email, q.requested_at
        FROM room_join_requests q
        INNER JOIN users u ON u.id = q.user_id
        WHERE q.room_id = ?
        ORDER BY q.requested_at ASC
        "#,
    )
    .bind(room_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(JoinRequestInfo {
                id: parse_id(row.get("id"))?,
                user_id: parse_id(row.get("user_id"))?,
                user_email: row.get("user_email"),
                requested_at: row.get("requested_at"),
            })
        })
        .collect()
}

/// Delete a join request by id. Returns whether a row was removed.
pub async fn delete_join_request(pool: &SqlitePool, request_id: Uuid) -> ApiResult<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM room_join_requests WHERE id = ?
        "#,
    )
    .bind(request_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
