//! Thought scope and update semantics.
//!
//! A thought is either personal (`room_id` null, visible to its author
//! alone) or room-scoped (visible to the room's members). The scope is fixed
//! at creation and never migrates; update requests cannot move a thought
//! between walls.
//!
//! Updates are partial: absent/null fields keep their value, boolean flags
//! always overwrite, and `assigned_to` distinguishes "absent" (keep) from
//! "null" (unassign) from "value" (assign).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::thoughts::db::Thought;

pub const DEFAULT_TAG: &str = "General";
pub const MAX_CONTENT_LEN: usize = 1000;
pub const MAX_TAG_LEN: usize = 20;

/// Which wall a listing reads from.
#[derive(Debug, Clone, Copy)]
pub enum ListScope {
    /// The caller's personal wall.
    Personal(Uuid),
    /// A room's shared wall.
    Room(Uuid),
}

/// POST /api/thoughts request body.
#[derive(Debug, Deserialize)]
pub struct NewThoughtRequest {
    pub content: String,
    pub tag: Option<String>,
    pub room_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

/// PUT /api/thoughts/{id} request body.
///
/// `assigned_to` is a double option: `None` when the field is absent,
/// `Some(None)` for an explicit `null`, `Some(Some(id))` for a value.
#[derive(Debug, Default, Deserialize)]
pub struct ThoughtUpdateRequest {
    pub content: Option<String>,
    pub tag: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<Uuid>>,
}

/// How an update request wants to change the assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentChange {
    Keep,
    Clear,
    Assign(Uuid),
}

impl ThoughtUpdateRequest {
    pub fn assignment_change(&self) -> AssignmentChange {
        match self.assigned_to {
            None => AssignmentChange::Keep,
            Some(None) => AssignmentChange::Clear,
            Some(Some(user_id)) => AssignmentChange::Assign(user_id),
        }
    }
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

/// Check and normalize content: must be non-blank and within bounds.
pub fn validate_content(content: &str) -> ApiResult<&str> {
    if content.trim().is_empty() {
        return Err(ApiError::bad_request("content cannot be empty"));
    }
    if content.len() > MAX_CONTENT_LEN {
        return Err(ApiError::bad_request("content too long"));
    }
    Ok(content)
}

/// Normalize a tag: empty/missing falls back to the default.
pub fn normalize_tag(tag: Option<&str>) -> ApiResult<String> {
    match tag.map(str::trim) {
        None | Some("") => Ok(DEFAULT_TAG.to_string()),
        Some(tag) if tag.len() > MAX_TAG_LEN => Err(ApiError::bad_request("tag too long")),
        Some(tag) => Ok(tag.to_string()),
    }
}

/// Apply the partial-update fields to a thought (everything except the
/// assignment, which needs membership validation against the Directory).
///
/// Blank content is ignored rather than rejected so a flags-only update
/// does not have to echo the text back.
pub fn apply_update(thought: &mut Thought, update: &ThoughtUpdateRequest) -> ApiResult<()> {
    if let Some(content) = update.content.as_deref() {
        if !content.trim().is_empty() {
            if content.len() > MAX_CONTENT_LEN {
                return Err(ApiError::bad_request("content too long"));
            }
            thought.content = content.to_string();
        }
    }
    if let Some(tag) = update.tag.as_deref() {
        thought.tag = normalize_tag(Some(tag))?;
    }

    // Flags always overwrite.
    thought.pinned = update.pinned;
    thought.completed = update.completed;

    if let Some(due_date) = update.due_date {
        thought.due_date = Some(due_date);
    }

    Ok(())
}
