//! Per-room mutual exclusion.
//!
//! Membership and join-request mutations for a single room must not
//! interleave (a `request_join` racing an `approve` could otherwise leave a
//! user both a member and pending). [`RoomLocks`] hands out one async mutex
//! per room id; operations on different rooms never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of per-room async locks, shared via the application state.
#[derive(Clone)]
pub struct RoomLocks {
    locks: Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

impl RoomLocks {
    pub fn new() -> Self {
        Self {
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Acquire the lock for a room, waiting if another request holds it.
    pub async fn acquire(&self, room_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().expect("room lock registry poisoned");
            locks
                .entry(room_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Drop the lock entry for a room that no longer exists.
    pub fn forget(&self, room_id: Uuid) {
        self.locks
            .lock()
            .expect("room lock registry poisoned")
            .remove(&room_id);
    }
}

impl Default for RoomLocks {
    fn default() -> Self {
        Self::new()
    }
}
