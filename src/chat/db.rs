//! Database operations for chat messages. Messages are append-only; only
//! the room cascade ever deletes them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::db::parse_id;
use crate::error::ApiResult;

/// A chat message with its sender's email joined in for display.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender_id: Uuid,
    pub sender_email: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Append a message to a room.
pub async fn store_message(
    pool: &SqlitePool,
    room_id: Uuid,
    sender_id: Uuid,
    sender_email: &str,
    content: &str,
) -> ApiResult<ChatMessage> {
    let message = ChatMessage {
        id: Uuid::new_v4(),
        room_id,
        sender_id,
        sender_email: sender_email.to_string(),
        content: content.to_string(),
        timestamp: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO chat_messages (id, room_id, sender_id, content, timestamp)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(message.id.to_string())
    .bind(room_id.to_string())
    .bind(sender_id.to_string())
    .bind(content)
    .bind(message.timestamp)
    .execute(pool)
    .await?;

    Ok(message)
}

/// A room's history, oldest first.
pub async fn messages_for_room(pool: &SqlitePool, room_id: Uuid) -> ApiResult<Vec<ChatMessage>> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.room_id, c.sender_id, u.email AS sender_email, c.content, c.timestamp
        FROM chat_messages c
        INNER JOIN users u ON u.id = c.sender_id
        WHERE c.room_id = ?
        ORDER BY c.timestamp ASC
        "#,
    )
    .bind(room_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(ChatMessage {
                id: parse_id(row.get("id"))?,
                room_id: parse_id(row.get("room_id"))?,
                sender_id: parse_id(row.get("sender_id"))?,
                sender_email: row.get("sender_email"),
                content: row.get("content"),
                timestamp: row.get("timestamp"),
            })
        })
        .collect()
}
