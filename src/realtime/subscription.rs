//! Per-room SSE subscription handler.
//!
//! `GET /api/rooms/{id}/events` turns a member's request into a Server-Sent
//! Events stream of invalidation tokens. SSE fits the channel's contract: a
//! reliable, ordered, one-way stream per connection, with axum's keep-alive
//! comments holding it open between tokens.

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream;
use std::convert::Infallible;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use uuid::Uuid;

use crate::authz;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthUser;
use crate::realtime::broadcast::INVALIDATION_TOKEN;
use crate::rooms::db::load_room_access;
use crate::server::state::AppState;

/// Subscribe the caller to a room's invalidation topic.
///
/// Membership is checked at subscribe time; a member kicked later keeps the
/// already-open stream until it closes but can no longer re-subscribe.
/// Dropping the connection is the unsubscribe.
pub async fn room_events(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let access = load_room_access(&app_state.db_pool, room_id)
        .await?
        .ok_or(ApiError::NotFound("room"))?;
    authz::subscribe_room(user.user_id, &access).require()?;

    let receiver = app_state.room_topics.subscribe(room_id);
    tracing::debug!(%room_id, user_id = %user.user_id, "room subscription opened");

    let stream = stream::unfold(receiver, move |mut rx| async move {
        match rx.recv().await {
            Ok(token) => Some((Ok(Event::default().data(token)), rx)),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                // Tokens carry no payload, so any number of missed ones
                // collapse into a single "re-fetch now".
                tracing::debug!(%room_id, skipped, "subscriber lagged, collapsing tokens");
                Some((Ok(Event::default().data(INVALIDATION_TOKEN)), rx))
            }
            Err(broadcast::error::RecvError::Closed) => {
                // The room was deleted; end the stream.
                tracing::debug!(%room_id, "room topic closed, ending subscription");
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
