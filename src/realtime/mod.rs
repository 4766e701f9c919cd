//! Real-time invalidation channel.
//!
//! - `broadcast` - the per-room topic registry ([`broadcast::RoomTopics`])
//! - `subscription` - the SSE handler that connects a member to a topic
//!
//! The channel carries coherence signals, not data: a token means "re-fetch
//! this room", and clients that miss one catch up on their next fetch.

pub mod broadcast;
pub mod subscription;

pub use broadcast::RoomTopics;
