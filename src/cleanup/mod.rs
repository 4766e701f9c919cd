//! Cleanup coordinator.
//!
//! Cascading deletion is driven explicitly from here - not by schema
//! metadata - so the order of steps is visible and testable. Both cascades
//! run inside a single transaction: concurrent readers observe the full
//! pre-deletion or full post-deletion state, never a partial cascade, and an
//! aborted request rolls the whole cascade back (dropping an uncommitted
//! sqlx transaction is a rollback).

use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::db::parse_id;
use crate::error::ApiResult;

/// Delete a room and everything it owns, inside the caller's transaction:
/// join requests, chat messages, contained thoughts, the member set, then
/// the room row itself (which releases its join code).
pub async fn delete_room_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    room_id: Uuid,
) -> ApiResult<()> {
    let room_id = room_id.to_string();

    sqlx::query("DELETE FROM room_join_requests WHERE room_id = ?")
        .bind(&room_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM chat_messages WHERE room_id = ?")
        .bind(&room_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM thoughts WHERE room_id = ?")
        .bind(&room_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM room_members WHERE room_id = ?")
        .bind(&room_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM rooms WHERE id = ?")
        .bind(&room_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// What a user-deletion cascade touched, for post-commit notification.
#[derive(Debug)]
pub struct UserCascade {
    /// Rooms the user owned - gone entirely.
    pub deleted_rooms: Vec<Uuid>,
    /// Surviving rooms whose visible state changed (membership lost,
    /// thoughts removed, assignments cleared).
    pub touched_rooms: Vec<Uuid>,
}

/// Delete a user account, applying the four cascade steps atomically:
///
/// 1. clear `assigned_to` wherever it references the user (unassign, never
///    delete someone else's thought)
/// 2. remove the user from the member set of every room they joined but do
///    not own, and withdraw their pending join requests
/// 3. delete every room they own, in full
/// 4. delete the thoughts they authored (their personal wall, plus their
///    posts in surviving rooms, which would otherwise point at a missing
///    author)
pub async fn delete_user(pool: &SqlitePool, user_id: Uuid) -> ApiResult<UserCascade> {
    let id = user_id.to_string();

    let mut tx = pool.begin().await?;

    let owned_rows = sqlx::query("SELECT id FROM rooms WHERE owner_id = ?")
        .bind(&id)
        .fetch_all(&mut *tx)
        .await?;
    let mut deleted_rooms = Vec::with_capacity(owned_rows.len());
    for row in &owned_rows {
        deleted_rooms.push(parse_id(row.get("id"))?);
    }

    // Surviving rooms that will look different once this commits.
    let touched_rows = sqlx::query(
        r#"
        SELECT room_id FROM room_members
        WHERE user_id = ?1
        UNION
        SELECT room_id FROM thoughts
        WHERE room_id IS NOT NULL AND (user_id = ?1 OR assigned_to = ?1)
        "#,
    )
    .bind(&id)
    .fetch_all(&mut *tx)
    .await?;
    let mut touched_rooms = Vec::new();
    for row in &touched_rows {
        let room_id = parse_id(row.get("room_id"))?;
        if !deleted_rooms.contains(&room_id) {
            touched_rooms.push(room_id);
        }
    }

    // Step 1: unassign everywhere.
    sqlx::query("UPDATE thoughts SET assigned_to = NULL WHERE assigned_to = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    // Step 2: leave every room the user does not own, and withdraw any
    // pending join requests (an approve after this commit must not be able
    // to admit a user who no longer exists).
    sqlx::query(
        r#"
        DELETE FROM room_members
        WHERE user_id = ?1
          AND room_id NOT IN (SELECT id FROM rooms WHERE owner_id = ?1)
        "#,
    )
    .bind(&id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM room_join_requests WHERE user_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    // Step 3: owned rooms go down with the account.
    for room_id in &deleted_rooms {
        delete_room_in_tx(&mut tx, *room_id).await?;
    }

    // Step 4: authored thoughts (room-scoped ones in owned rooms are
    // already gone via step 3).
    sqlx::query("DELETE FROM thoughts WHERE user_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        user_id = %user_id,
        deleted_rooms = deleted_rooms.len(),
        touched_rooms = touched_rooms.len(),
        "user account deleted"
    );

    Ok(UserCascade {
        deleted_rooms,
        touched_rooms,
    })
}
