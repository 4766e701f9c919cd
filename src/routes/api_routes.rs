//! Protected API endpoints.
//!
//! Every route configured here sits behind the auth middleware; handlers can
//! rely on [`AuthUser`](crate::middleware::auth::AuthUser) being present.
//!
//! # Routes
//!
//! ## Account
//! - `GET /api/auth/me` - current user
//! - `GET /api/users/profile` - rooms and assigned work
//! - `DELETE /api/users/me` - delete the account (full cascade)
//!
//! ## Rooms
//! - `POST /api/rooms` - create a room
//! - `GET /api/rooms` - rooms the caller is a member of
//! - `POST /api/rooms/join/{code}` - file a join request
//! - `GET /api/rooms/{id}/members` / `DELETE /api/rooms/{id}/members/{user_id}`
//! - `GET /api/rooms/{id}/requests` and approve/reject on a request id
//! - `DELETE /api/rooms/{id}` - delete the room
//! - `GET /api/rooms/{id}/messages` / `POST /api/rooms/{id}/messages` - chat
//! - `GET /api/rooms/{id}/events` - SSE invalidation stream
//!
//! ## Thoughts
//! - `GET/POST /api/thoughts`, `GET/PUT/DELETE /api/thoughts/{id}`
//! - `PUT /api/thoughts/tags/migrate` - bulk tag rename

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::auth::handlers::me;
use crate::chat::handlers::{chat_history, post_message};
use crate::realtime::subscription::room_events;
use crate::rooms::handlers::{
    approve_request, create_room, delete_room, join_room, kick_member, my_rooms, reject_request,
    room_members, room_requests,
};
use crate::server::state::AppState;
use crate::thoughts::handlers::{
    create_thought, delete_thought, get_thought, list_thoughts, migrate_tags, update_thought,
};
use crate::users::handlers::{delete_account, profile};

pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Account
        .route("/api/auth/me", get(me))
        .route("/api/users/profile", get(profile))
        .route("/api/users/me", delete(delete_account))
        // Rooms & membership
        .route("/api/rooms", post(create_room).get(my_rooms))
        .route("/api/rooms/join/{code}", post(join_room))
        .route("/api/rooms/{id}", delete(delete_room))
        .route("/api/rooms/{id}/members", get(room_members))
        .route("/api/rooms/{id}/members/{user_id}", delete(kick_member))
        .route("/api/rooms/{id}/requests", get(room_requests))
        .route(
            "/api/rooms/{id}/requests/{request_id}/approve",
            post(approve_request),
        )
        .route(
            "/api/rooms/{id}/requests/{request_id}",
            delete(reject_request),
        )
        // Chat
        .route(
            "/api/rooms/{id}/messages",
            get(chat_history).post(post_message),
        )
        // Real-time invalidation channel
        .route("/api/rooms/{id}/events", get(room_events))
        // Thoughts
        .route("/api/thoughts", get(list_thoughts).post(create_thought))
        .route("/api/thoughts/tags/migrate", put(migrate_tags))
        .route(
            "/api/thoughts/{id}",
            get(get_thought).put(update_thought).delete(delete_thought),
        )
}
