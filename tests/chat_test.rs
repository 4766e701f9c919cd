//! Room chat integration tests.

mod common;

use common::{create_room, join_and_approve, signup, spawn_app};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[tokio::test]
async fn chat_is_member_only_and_ordered() {
    let app = spawn_app().await;
    let alice = signup(&app, "alice@example.com").await;
    let bob = signup(&app, "bob@example.com").await;
    let carol = signup(&app, "carol@example.com").await;
    let (room_id, code) = create_room(&app, &alice, "Sprint").await;
    join_and_approve(&app, &alice, &bob, &code).await;

    for (user, content) in [(&alice, "first"), (&bob, "second"), (&alice, "third")] {
        let response = app
            .server
            .post(&format!("/api/rooms/{room_id}/messages"))
            .authorization_bearer(&user.token)
            .json(&json!({ "content": content }))
            .await;
        assert_eq!(response.status_code(), 200);
    }

    // A stranger can neither post nor read.
    let response = app
        .server
        .post(&format!("/api/rooms/{room_id}/messages"))
        .authorization_bearer(&carol.token)
        .json(&json!({ "content": "intruder" }))
        .await;
    assert_eq!(response.status_code(), 403);

    let response = app
        .server
        .get(&format!("/api/rooms/{room_id}/messages"))
        .authorization_bearer(&carol.token)
        .await;
    assert_eq!(response.status_code(), 403);

    // History comes back oldest first, with sender info joined in.
    let history: Value = app
        .server
        .get(&format!("/api/rooms/{room_id}/messages"))
        .authorization_bearer(&bob.token)
        .await
        .json();
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 3);
    let contents: Vec<&str> = history
        .iter()
        .map(|message| message["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["first", "second", "third"]);
    assert_eq!(history[1]["sender_email"], "bob@example.com");
}

#[tokio::test]
async fn empty_messages_are_rejected() {
    let app = spawn_app().await;
    let alice = signup(&app, "alice@example.com").await;
    let (room_id, _code) = create_room(&app, &alice, "Sprint").await;

    let response = app
        .server
        .post(&format!("/api/rooms/{room_id}/messages"))
        .authorization_bearer(&alice.token)
        .json(&json!({ "content": "   " }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn posting_to_an_unknown_room_is_not_found() {
    let app = spawn_app().await;
    let alice = signup(&app, "alice@example.com").await;

    let response = app
        .server
        .post("/api/rooms/00000000-0000-0000-0000-000000000000/messages")
        .authorization_bearer(&alice.token)
        .json(&json!({ "content": "hello" }))
        .await;
    assert_eq!(response.status_code(), 404);
}
