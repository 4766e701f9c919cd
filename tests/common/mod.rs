//! Common test utilities and helpers.
//!
//! Every integration test runs the real router over a private in-memory
//! SQLite database, so `cargo test` needs no external services. The fixture
//! keeps a handle on the [`AppState`] so tests can observe the room topics
//! directly (the SSE handler reads from the same registry).

#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use thoughtwall::routes::create_router;
use thoughtwall::server::config::MIGRATOR;
use thoughtwall::server::AppState;

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

/// Spin up the application over a fresh in-memory database.
///
/// A single pooled connection keeps every handle on the same in-memory
/// database (each new `:memory:` connection would otherwise be a blank one).
pub async fn spawn_app() -> TestApp {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");
    MIGRATOR
        .run(&pool)
        .await
        .expect("failed to run migrations");

    let state = AppState::new(pool);
    let server =
        TestServer::new(create_router(state.clone())).expect("failed to start test server");

    TestApp { server, state }
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// Register a user and return their identity and token.
pub async fn signup(app: &TestApp, email: &str) -> TestUser {
    let response = app
        .server
        .post("/api/auth/signup")
        .json(&json!({ "email": email, "password": "password123" }))
        .await;
    assert_eq!(
        response.status_code(),
        200,
        "signup failed: {}",
        response.text()
    );

    let body: Value = response.json();
    TestUser {
        id: body["user"]["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("signup response carries the user id"),
        email: email.to_string(),
        token: body["token"].as_str().expect("token present").to_string(),
    }
}

/// Create a room and return its id and join code.
pub async fn create_room(app: &TestApp, owner: &TestUser, name: &str) -> (Uuid, String) {
    let response = app
        .server
        .post("/api/rooms")
        .authorization_bearer(&owner.token)
        .json(&json!({ "name": name }))
        .await;
    assert_eq!(
        response.status_code(),
        200,
        "room creation failed: {}",
        response.text()
    );

    let body: Value = response.json();
    let room_id = body["id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("room id present");
    let code = body["code"].as_str().expect("code present").to_string();
    (room_id, code)
}

/// Walk a user through the join workflow: request by code, owner approves.
pub async fn join_and_approve(app: &TestApp, owner: &TestUser, joiner: &TestUser, code: &str) {
    let response = app
        .server
        .post(&format!("/api/rooms/join/{code}"))
        .authorization_bearer(&joiner.token)
        .await;
    assert_eq!(response.status_code(), 200, "join request failed");

    let room_id = room_id_for_code(app, owner, code).await;
    let requests: Value = app
        .server
        .get(&format!("/api/rooms/{room_id}/requests"))
        .authorization_bearer(&owner.token)
        .await
        .json();
    let request_id = requests
        .as_array()
        .and_then(|requests| {
            requests
                .iter()
                .find(|request| request["user_id"] == joiner.id.to_string().as_str())
        })
        .and_then(|request| request["id"].as_str())
        .expect("pending request for joiner")
        .to_string();

    let response = app
        .server
        .post(&format!("/api/rooms/{room_id}/requests/{request_id}/approve"))
        .authorization_bearer(&owner.token)
        .await;
    assert_eq!(response.status_code(), 200, "approve failed");
}

/// Find a room id by join code via the owner's room list.
pub async fn room_id_for_code(app: &TestApp, owner: &TestUser, code: &str) -> Uuid {
    let rooms: Value = app
        .server
        .get("/api/rooms")
        .authorization_bearer(&owner.token)
        .await
        .json();
    rooms
        .as_array()
        .and_then(|rooms| rooms.iter().find(|room| room["code"] == code))
        .and_then(|room| room["id"].as_str())
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("room with that code in the owner's list")
}

/// Post a thought and return its id.
pub async fn post_thought(
    app: &TestApp,
    author: &TestUser,
    content: &str,
    room_id: Option<Uuid>,
) -> Uuid {
    let response = app
        .server
        .post("/api/thoughts")
        .authorization_bearer(&author.token)
        .json(&json!({
            "content": content,
            "room_id": room_id.map(|id| id.to_string()),
        }))
        .await;
    assert_eq!(
        response.status_code(),
        200,
        "posting thought failed: {}",
        response.text()
    );

    let body: Value = response.json();
    body["id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("thought id present")
}
