//! Database operations for thoughts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::db::parse_id;
use crate::error::ApiResult;
use crate::thoughts::scope::ListScope;

/// A thought row.
#[derive(Debug, Clone, Serialize)]
pub struct Thought {
    pub id: Uuid,
    pub content: String,
    pub tag: String,
    pub pinned: bool,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Author. Required.
    pub user_id: Uuid,
    /// Scope selector: null means personal. Fixed at creation.
    pub room_id: Option<Uuid>,
    /// Assignee; always a member of `room_id` when set.
    pub assigned_to: Option<Uuid>,
}

impl Thought {
    pub(crate) fn from_row(row: &SqliteRow) -> ApiResult<Self> {
        let room_id: Option<String> = row.get("room_id");
        let assigned_to: Option<String> = row.get("assigned_to");
        Ok(Self {
            id: parse_id(row.get("id"))?,
            content: row.get("content"),
            tag: row.get("tag"),
            pinned: row.get("pinned"),
            completed: row.get("completed"),
            due_date: row.get("due_date"),
            created_at: row.get("created_at"),
            user_id: parse_id(row.get("user_id"))?,
            room_id: room_id.as_deref().map(parse_id).transpose()?,
            assigned_to: assigned_to.as_deref().map(parse_id).transpose()?,
        })
    }
}

const THOUGHT_COLUMNS: &str =
    "id, content, tag, pinned, completed, due_date, created_at, user_id, room_id, assigned_to";

/// Composite listing order (stable and total): open items first, nearest due
/// date first with undated last, pinned above unpinned, newest first, id as
/// the final tiebreak.
const LISTING_ORDER: &str = "ORDER BY completed ASC, (due_date IS NULL) ASC, due_date ASC, \
     pinned DESC, created_at DESC, id ASC";

pub async fn insert_thought(pool: &SqlitePool, thought: &Thought) -> ApiResult<()> {
    sqlx::query(
        r#"
        INSERT INTO thoughts
            (id, content, tag, pinned, completed, due_date, created_at, user_id, room_id, assigned_to)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(thought.id.to_string())
    .bind(&thought.content)
    .bind(&thought.tag)
    .bind(thought.pinned)
    .bind(thought.completed)
    .bind(thought.due_date)
    .bind(thought.created_at)
    .bind(thought.user_id.to_string())
    .bind(thought.room_id.map(|id| id.to_string()))
    .bind(thought.assigned_to.map(|id| id.to_string()))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_thought(pool: &SqlitePool, thought_id: Uuid) -> ApiResult<Option<Thought>> {
    let sql = format!("SELECT {THOUGHT_COLUMNS} FROM thoughts WHERE id = ?");
    let row = sqlx::query(&sql)
        .bind(thought_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(Thought::from_row).transpose()
}

/// Persist the mutable fields of a thought. Scope (`user_id`, `room_id`,
/// `created_at`) is fixed at creation and never written back.
pub async fn update_thought(pool: &SqlitePool, thought: &Thought) -> ApiResult<()> {
    sqlx::query(
        r#"
        UPDATE thoughts
        SET content = ?, tag = ?, pinned = ?, completed = ?, due_date = ?, assigned_to = ?
        WHERE id = ?
        "#,
    )
    .bind(&thought.content)
    .bind(&thought.tag)
    .bind(thought.pinned)
    .bind(thought.completed)
    .bind(thought.due_date)
    .bind(thought.assigned_to.map(|id| id.to_string()))
    .bind(thought.id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_thought(pool: &SqlitePool, thought_id: Uuid) -> ApiResult<()> {
    sqlx::query("DELETE FROM thoughts WHERE id = ?")
        .bind(thought_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// List one page of a wall, with the total row count for pagination.
pub async fn list_thoughts(
    pool: &SqlitePool,
    scope: ListScope,
    tag: Option<&str>,
    page: u32,
    size: u32,
) -> ApiResult<(Vec<Thought>, i64)> {
    let (scope_clause, scope_id) = match scope {
        ListScope::Personal(user_id) => ("room_id IS NULL AND user_id = ?", user_id),
        ListScope::Room(room_id) => ("room_id = ?", room_id),
    };
    let tag_clause = if tag.is_some() { " AND tag = ?" } else { "" };

    let list_sql = format!(
        "SELECT {THOUGHT_COLUMNS} FROM thoughts WHERE {scope_clause}{tag_clause} \
         {LISTING_ORDER} LIMIT ? OFFSET ?"
    );
    let mut list_query = sqlx::query(&list_sql).bind(scope_id.to_string());
    if let Some(tag) = tag {
        list_query = list_query.bind(tag);
    }
    let offset = i64::from(page) * i64::from(size);
    let rows = list_query
        .bind(i64::from(size))
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) AS total FROM thoughts WHERE {scope_clause}{tag_clause}");
    let mut count_query = sqlx::query(&count_sql).bind(scope_id.to_string());
    if let Some(tag) = tag {
        count_query = count_query.bind(tag);
    }
    let total: i64 = count_query.fetch_one(pool).await?.get("total");

    let thoughts = rows
        .iter()
        .map(Thought::from_row)
        .collect::<ApiResult<Vec<_>>>()?;
    Ok((thoughts, total))
}

/// Rename a tag across the caller's own thoughts. Returns the number of
/// thoughts retagged.
pub async fn migrate_tag(
    pool: &SqlitePool,
    user_id: Uuid,
    old_tag: &str,
    new_tag: &str,
) -> ApiResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE thoughts SET tag = ? WHERE tag = ? AND user_id = ?
        "#,
    )
    .bind(new_tag)
    .bind(old_tag)
    .bind(user_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// A thought assigned to a user, annotated with its room name for the
/// profile view.
#[derive(Debug, Serialize)]
pub struct AssignedThought {
    pub id: Uuid,
    pub content: String,
    pub room_name: String,
    pub completed: bool,
}

/// Thoughts assigned to the user, with `"Personal"` standing in for the
/// room name of personal items.
pub async fn assigned_thoughts(pool: &SqlitePool, user_id: Uuid) -> ApiResult<Vec<AssignedThought>> {
    let rows = sqlx::query(
        r#"
        SELECT t.id, t.content, t.completed, COALESCE(r.name, 'Personal') AS room_name
        FROM thoughts t
        LEFT JOIN rooms r ON r.id = t.room_id
        WHERE t.assigned_to = ?
        ORDER BY t.created_at DESC
        "#,
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(AssignedThought {
                id: parse_id(row.get("id"))?,
                content: row.get("content"),
                room_name: row.get("room_name"),
                completed: row.get("completed"),
            })
        })
        .collect()
}
