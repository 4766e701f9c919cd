//! Deletion cascade integration tests.

mod common;

use common::{create_room, join_and_approve, post_thought, signup, spawn_app};
use serde_json::{json, Value};

#[tokio::test]
async fn deleting_a_user_unassigns_but_keeps_other_peoples_thoughts() {
    let app = spawn_app().await;
    let alice = signup(&app, "alice@example.com").await;
    let bob = signup(&app, "bob@example.com").await;
    let (room_id, code) = create_room(&app, &alice, "Sprint").await;
    join_and_approve(&app, &alice, &bob, &code).await;

    // Alice's thought, assigned to Bob.
    let thought_id = post_thought(&app, &alice, "review the draft", Some(room_id)).await;
    let response = app
        .server
        .put(&format!("/api/thoughts/{thought_id}"))
        .authorization_bearer(&alice.token)
        .json(&json!({ "assigned_to": bob.id.to_string() }))
        .await;
    assert_eq!(response.status_code(), 200);

    // Bob deletes his account.
    let response = app
        .server
        .delete("/api/users/me")
        .authorization_bearer(&bob.token)
        .await;
    assert_eq!(response.status_code(), 200);

    // The thought still exists, unassigned.
    let body: Value = app
        .server
        .get(&format!("/api/thoughts/{thought_id}"))
        .authorization_bearer(&alice.token)
        .await
        .json();
    assert_eq!(body["content"], "review the draft");
    assert!(body["assigned_to"].is_null());

    // Bob is gone from the member list and cannot log in again.
    let members: Value = app
        .server
        .get(&format!("/api/rooms/{room_id}/members"))
        .authorization_bearer(&alice.token)
        .await
        .json();
    assert_eq!(members.as_array().unwrap().len(), 1);

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "bob@example.com", "password": "password123" }))
        .await;
    assert_eq!(response.status_code(), 401);

    // Bob's token no longer authenticates.
    let response = app
        .server
        .get("/api/auth/me")
        .authorization_bearer(&bob.token)
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn deleting_a_user_takes_their_owned_rooms_down() {
    let app = spawn_app().await;
    let alice = signup(&app, "alice@example.com").await;
    let bob = signup(&app, "bob@example.com").await;
    let (room_id, code) = create_room(&app, &alice, "Sprint").await;
    join_and_approve(&app, &alice, &bob, &code).await;

    let bob_thought = post_thought(&app, &bob, "in the doomed room", Some(room_id)).await;
    let response = app
        .server
        .post(&format!("/api/rooms/{room_id}/messages"))
        .authorization_bearer(&bob.token)
        .json(&json!({ "content": "hello" }))
        .await;
    assert_eq!(response.status_code(), 200);

    // Alice (the owner) deletes her account.
    let response = app
        .server
        .delete("/api/users/me")
        .authorization_bearer(&alice.token)
        .await;
    assert_eq!(response.status_code(), 200);

    // The owned room cascaded away, taking Bob's thought in it.
    let response = app
        .server
        .get(&format!("/api/rooms/{room_id}/members"))
        .authorization_bearer(&bob.token)
        .await;
    assert_eq!(response.status_code(), 404);

    let response = app
        .server
        .get(&format!("/api/thoughts/{bob_thought}"))
        .authorization_bearer(&bob.token)
        .await;
    assert_eq!(response.status_code(), 404);

    // Bob survives with an empty room list.
    let rooms: Value = app
        .server
        .get("/api/rooms")
        .authorization_bearer(&bob.token)
        .await
        .json();
    assert!(rooms.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_user_removes_their_thoughts_and_membership_rows() {
    let app = spawn_app().await;
    let alice = signup(&app, "alice@example.com").await;
    let bob = signup(&app, "bob@example.com").await;
    let (room_id, code) = create_room(&app, &alice, "Sprint").await;
    join_and_approve(&app, &alice, &bob, &code).await;

    // Bob has a personal thought and a post in Alice's (surviving) room.
    post_thought(&app, &bob, "personal", None).await;
    let room_thought = post_thought(&app, &bob, "in alices room", Some(room_id)).await;

    let response = app
        .server
        .delete("/api/users/me")
        .authorization_bearer(&bob.token)
        .await;
    assert_eq!(response.status_code(), 200);

    // The room survives, without Bob or his posts.
    let members: Value = app
        .server
        .get(&format!("/api/rooms/{room_id}/members"))
        .authorization_bearer(&alice.token)
        .await
        .json();
    assert_eq!(members.as_array().unwrap().len(), 1);

    let response = app
        .server
        .get(&format!("/api/thoughts/{room_thought}"))
        .authorization_bearer(&alice.token)
        .await;
    assert_eq!(response.status_code(), 404);

    let wall: Value = app
        .server
        .get(&format!("/api/thoughts?room_id={room_id}"))
        .authorization_bearer(&alice.token)
        .await
        .json();
    assert_eq!(wall["total_items"], 0);
}

#[tokio::test]
async fn deleting_a_user_discards_their_pending_join_requests() {
    let app = spawn_app().await;
    let alice = signup(&app, "alice@example.com").await;
    let bob = signup(&app, "bob@example.com").await;
    let (room_id, code) = create_room(&app, &alice, "Sprint").await;

    let response = app
        .server
        .post(&format!("/api/rooms/join/{code}"))
        .authorization_bearer(&bob.token)
        .await;
    assert_eq!(response.status_code(), 200);

    let response = app
        .server
        .delete("/api/users/me")
        .authorization_bearer(&bob.token)
        .await;
    assert_eq!(response.status_code(), 200);

    let requests: Value = app
        .server
        .get(&format!("/api/rooms/{room_id}/requests"))
        .authorization_bearer(&alice.token)
        .await
        .json();
    assert!(requests.as_array().unwrap().is_empty());
}
