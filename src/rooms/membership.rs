//! Membership authority.
//!
//! Owns the room lifecycle and the join-request state machine:
//!
//! ```text
//! Stranger -[request_join]-> Pending -[approve]-> Member
//!                            Pending -[reject]--> Stranger
//! ```
//!
//! The owner is a member from creation and stays one until the room is
//! deleted. All mutations for one room run under that room's lock (see
//! [`RoomLocks`]); multi-row steps additionally run in a transaction so an
//! aborted request never leaves partial state.

use chrono::Utc;
use rand::Rng;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::authz;
use crate::cleanup;
use crate::error::{ApiError, ApiResult};
use crate::rooms::db::{self, JoinRequest, JoinRequestInfo, Room};
use crate::rooms::locks::RoomLocks;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 6;

/// Attempts before giving up on code allocation. With a 36^6 space this is
/// effectively unreachable; it bounds the loop if the table fills up.
const MAX_CODE_ATTEMPTS: usize = 16;

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Create a room owned by `owner`, with a freshly reserved unique code.
///
/// Code reservation is check-and-insert: the insert itself claims the code
/// via the UNIQUE index, and a collision just retries with a new code. Two
/// concurrent creations can never share a code.
pub async fn create_room(pool: &SqlitePool, owner: Uuid, name: &str) -> ApiResult<Room> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("room name cannot be empty"));
    }

    for _ in 0..MAX_CODE_ATTEMPTS {
        let room = Room {
            id: Uuid::new_v4(),
            name: name.to_string(),
            code: generate_code(),
            owner_id: owner,
            created_at: Utc::now(),
        };

        if db::try_insert_room(pool, &room).await?.is_some() {
            tracing::info!(room_id = %room.id, code = %room.code, "room created");
            return Ok(room);
        }
        tracing::debug!(code = %room.code, "join code collision, retrying");
    }

    Err(ApiError::internal("could not allocate a unique join code"))
}

/// File a join request against a room code.
pub async fn request_join(
    pool: &SqlitePool,
    locks: &RoomLocks,
    actor: Uuid,
    code: &str,
) -> ApiResult<JoinRequest> {
    let room = db::get_room_by_code(pool, code)
        .await?
        .ok_or(ApiError::NotFound("room"))?;

    let _guard = locks.acquire(room.id).await;

    let access = db::load_room_access(pool, room.id)
        .await?
        .ok_or(ApiError::NotFound("room"))?;
    let has_pending = db::has_pending_request(pool, room.id, actor).await?;

    authz::request_join(actor, &access, has_pending).require()?;

    let request = db::insert_join_request(pool, room.id, actor).await?;
    tracing::info!(room_id = %room.id, user_id = %actor, "join request filed");
    Ok(request)
}

/// List a room's pending requests. Owner only.
pub async fn list_requests(
    pool: &SqlitePool,
    actor: Uuid,
    room_id: Uuid,
) -> ApiResult<Vec<JoinRequestInfo>> {
    let access = db::load_room_access(pool, room_id)
        .await?
        .ok_or(ApiError::NotFound("room"))?;
    authz::manage_room(actor, &access).require()?;

    db::join_requests_for_room(pool, room_id).await
}

/// Approve a join request: the requester becomes a member and the request is
/// consumed, atomically. Returns the new member's id.
pub async fn approve(
    pool: &SqlitePool,
    locks: &RoomLocks,
    actor: Uuid,
    room_id: Uuid,
    request_id: Uuid,
) -> ApiResult<Uuid> {
    let _guard = locks.acquire(room_id).await;

    let access = db::load_room_access(pool, room_id)
        .await?
        .ok_or(ApiError::NotFound("room"))?;
    authz::manage_room(actor, &access).require()?;

    let request = db::get_join_request(pool, request_id)
        .await?
        .filter(|request| request.room_id == room_id)
        .ok_or(ApiError::NotFound("join request"))?;

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO room_members (room_id, user_id, joined_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(room_id.to_string())
    .bind(request.user_id.to_string())
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM room_join_requests WHERE id = ?
        "#,
    )
    .bind(request.id.to_string())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(room_id = %room_id, user_id = %request.user_id, "join request approved");
    Ok(request.user_id)
}

/// Reject a join request. A missing or already-consumed request id is
/// `NotFound` - a silent success would claim a deletion that never happened.
pub async fn reject(
    pool: &SqlitePool,
    locks: &RoomLocks,
    actor: Uuid,
    room_id: Uuid,
    request_id: Uuid,
) -> ApiResult<()> {
    let _guard = locks.acquire(room_id).await;

    let access = db::load_room_access(pool, room_id)
        .await?
        .ok_or(ApiError::NotFound("room"))?;
    authz::manage_room(actor, &access).require()?;

    let request = db::get_join_request(pool, request_id)
        .await?
        .filter(|request| request.room_id == room_id)
        .ok_or(ApiError::NotFound("join request"))?;

    db::delete_join_request(pool, request.id).await?;
    tracing::info!(room_id = %room_id, user_id = %request.user_id, "join request rejected");
    Ok(())
}

/// Remove a member. The owner cannot be kicked; the target's previously
/// posted room thoughts are left untouched.
pub async fn kick(
    pool: &SqlitePool,
    locks: &RoomLocks,
    actor: Uuid,
    room_id: Uuid,
    target: Uuid,
) -> ApiResult<()> {
    let _guard = locks.acquire(room_id).await;

    let access = db::load_room_access(pool, room_id)
        .await?
        .ok_or(ApiError::NotFound("room"))?;
    authz::manage_room(actor, &access).require()?;

    if target == access.owner_id {
        return Err(ApiError::bad_request("cannot kick the owner"));
    }
    if !db::remove_member(pool, room_id, target).await? {
        return Err(ApiError::NotFound("member"));
    }

    tracing::info!(room_id = %room_id, user_id = %target, "member kicked");
    Ok(())
}

/// Delete a room and everything it contains. Owner only.
pub async fn delete_room(
    pool: &SqlitePool,
    locks: &RoomLocks,
    actor: Uuid,
    room_id: Uuid,
) -> ApiResult<()> {
    let _guard = locks.acquire(room_id).await;

    let access = db::load_room_access(pool, room_id)
        .await?
        .ok_or(ApiError::NotFound("room"))?;
    authz::manage_room(actor, &access).require()?;

    let mut tx = pool.begin().await?;
    cleanup::delete_room_in_tx(&mut tx, room_id).await?;
    tx.commit().await?;

    locks.forget(room_id);
    tracing::info!(room_id = %room_id, "room deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_have_the_documented_shape() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code
                .bytes()
                .all(|byte| CODE_ALPHABET.contains(&byte)));
        }
    }

    #[test]
    fn generated_codes_vary() {
        let first = generate_code();
        // 100 draws from a 36^6 space colliding every time is not chance.
        assert!((0..100).any(|_| generate_code() != first));
    }
}
