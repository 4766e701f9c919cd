//! Application state.
//!
//! [`AppState`] is the central state container handed to the router:
//! the Directory connection pool, the per-room invalidation topics, and the
//! per-room lock registry. All three are cheap to clone and safe under
//! concurrent access. The `FromRef` impls let handlers extract just the part
//! they need.

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::realtime::broadcast::RoomTopics;
use crate::rooms::locks::RoomLocks;

#[derive(Clone)]
pub struct AppState {
    /// Directory connection pool.
    pub db_pool: SqlitePool,

    /// Per-room invalidation broadcast registry. Created at startup, dropped
    /// at shutdown; subscribe/publish are its only mutation entry points.
    pub room_topics: RoomTopics,

    /// Per-room mutual exclusion for membership mutations.
    pub room_locks: RoomLocks,
}

impl AppState {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self {
            db_pool,
            room_topics: RoomTopics::new(),
            room_locks: RoomLocks::new(),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

impl FromRef<AppState> for RoomTopics {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.room_topics.clone()
    }
}

impl FromRef<AppState> for RoomLocks {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.room_locks.clone()
    }
}
