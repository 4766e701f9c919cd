//! Rooms: the membership authority and its HTTP surface.
//!
//! - `db` - room/member/join-request rows and Directory operations
//! - `locks` - per-room mutual exclusion for membership mutations
//! - `membership` - room lifecycle and the join-request state machine
//! - `handlers` - the `/api/rooms` endpoints

pub mod db;
pub mod handlers;
pub mod locks;
pub mod membership;
