//! Per-room invalidation broadcasting.
//!
//! [`RoomTopics`] is the process-scoped registry behind the real-time
//! channel: one `tokio::sync::broadcast` channel per room id, created lazily
//! on first use and torn down when the registry is dropped at shutdown.
//! `subscribe` and `publish` are its only entry points; nothing else mutates
//! the map.
//!
//! A published signal is an invalidation token, not data: it tells a
//! subscribed session "something in this room changed, re-fetch". Delivery is
//! best-effort and at-most-once - a session that is not subscribed at publish
//! time simply misses the token, and a lagging subscriber has old tokens
//! overwritten by the channel's ring buffer. The publisher never waits on a
//! subscriber.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use uuid::Uuid;

/// The payload-free "something changed" token.
pub const INVALIDATION_TOKEN: &str = "UPDATE";

/// Capacity of each per-room channel. Tokens carry no data, so a small ring
/// buffer is enough; a subscriber that lags past it just re-fetches once.
const TOPIC_CAPACITY: usize = 64;

/// Registry of per-room broadcast topics.
///
/// Cloning is cheap and shares the underlying map; one instance lives in the
/// application state for the life of the process.
#[derive(Clone)]
pub struct RoomTopics {
    channels: Arc<Mutex<HashMap<Uuid, broadcast::Sender<String>>>>,
}

impl RoomTopics {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Subscribe to a room's topic, creating the topic if needed.
    ///
    /// Subscribing is idempotent in effect: every call yields an independent
    /// receiver on the same topic, and dropping the receiver is the
    /// unsubscribe.
    pub fn subscribe(&self, room_id: Uuid) -> broadcast::Receiver<String> {
        self.sender(room_id).subscribe()
    }

    /// Publish an invalidation token to every current subscriber of a room.
    ///
    /// Returns the number of subscribers the token reached. Never blocks: a
    /// topic with no subscribers drops the token on the floor.
    pub fn publish(&self, room_id: Uuid, token: &str) -> usize {
        let sender = {
            let channels = self.channels.lock().expect("room topic registry poisoned");
            channels.get(&room_id).cloned()
        };

        match sender.map(|tx| tx.send(token.to_string())) {
            Some(Ok(count)) => {
                tracing::debug!(%room_id, count, "published room invalidation");
                count
            }
            _ => 0,
        }
    }

    /// Publish the standard invalidation token.
    pub fn invalidate(&self, room_id: Uuid) -> usize {
        self.publish(room_id, INVALIDATION_TOKEN)
    }

    /// Close a room's topic (the room was deleted). Current subscribers see
    /// the channel end after draining buffered tokens.
    pub fn close(&self, room_id: Uuid) {
        self.channels
            .lock()
            .expect("room topic registry poisoned")
            .remove(&room_id);
    }

    /// Drop topics that no longer have any subscriber.
    pub fn cleanup_idle(&self) {
        self.channels
            .lock()
            .expect("room topic registry poisoned")
            .retain(|_, sender| sender.receiver_count() > 0);
    }

    /// Current subscriber count for a room's topic.
    pub fn subscriber_count(&self, room_id: Uuid) -> usize {
        self.channels
            .lock()
            .expect("room topic registry poisoned")
            .get(&room_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    fn sender(&self, room_id: Uuid) -> broadcast::Sender<String> {
        let mut channels = self.channels.lock().expect("room topic registry poisoned");
        channels
            .entry(room_id)
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .clone()
    }
}

impl Default for RoomTopics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_token() {
        let topics = RoomTopics::new();
        let room_id = Uuid::new_v4();

        let mut rx = topics.subscribe(room_id);
        let reached = topics.invalidate(room_id);

        assert_eq!(reached, 1);
        assert_eq!(rx.recv().await.unwrap(), INVALIDATION_TOKEN);
    }

    #[tokio::test]
    async fn publish_without_subscribers_reaches_nobody() {
        let topics = RoomTopics::new();
        assert_eq!(topics.invalidate(Uuid::new_v4()), 0);
    }

    #[tokio::test]
    async fn topics_are_isolated_per_room() {
        let topics = RoomTopics::new();
        let room_a = Uuid::new_v4();
        let room_b = Uuid::new_v4();

        let mut rx_a = topics.subscribe(room_a);
        let mut rx_b = topics.subscribe(room_b);

        topics.invalidate(room_a);

        assert_eq!(rx_a.recv().await.unwrap(), INVALIDATION_TOKEN);
        assert!(matches!(
            rx_b.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn fan_out_reaches_every_subscriber() {
        let topics = RoomTopics::new();
        let room_id = Uuid::new_v4();

        let mut receivers: Vec<_> = (0..3).map(|_| topics.subscribe(room_id)).collect();
        assert_eq!(topics.subscriber_count(room_id), 3);
        assert_eq!(topics.invalidate(room_id), 3);

        for rx in &mut receivers {
            assert_eq!(rx.recv().await.unwrap(), INVALIDATION_TOKEN);
        }
    }

    #[tokio::test]
    async fn lagged_subscriber_drops_old_tokens_without_blocking_publisher() {
        let topics = RoomTopics::new();
        let room_id = Uuid::new_v4();

        let mut rx = topics.subscribe(room_id);
        for _ in 0..(TOPIC_CAPACITY + 8) {
            topics.invalidate(room_id);
        }

        // The first recv reports the overflow; the stream then resumes.
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
        assert_eq!(rx.recv().await.unwrap(), INVALIDATION_TOKEN);
    }

    #[tokio::test]
    async fn closed_topic_ends_existing_subscriptions() {
        let topics = RoomTopics::new();
        let room_id = Uuid::new_v4();

        let mut rx = topics.subscribe(room_id);
        topics.close(room_id);

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
        assert_eq!(topics.invalidate(room_id), 0);
    }

    #[tokio::test]
    async fn cleanup_drops_only_idle_topics() {
        let topics = RoomTopics::new();
        let live = Uuid::new_v4();
        let idle = Uuid::new_v4();

        let _rx = topics.subscribe(live);
        drop(topics.subscribe(idle));

        topics.cleanup_idle();

        assert_eq!(topics.subscriber_count(live), 1);
        assert_eq!(topics.channels.lock().unwrap().len(), 1);
    }
}
