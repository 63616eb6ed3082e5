//! Messaging API integration tests
//!
//! Exercises the HTTP surface end to end: conversation lifecycle,
//! authorization, unread counts, typing presence, attachments, and
//! notifications.

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use common::{spawn_app, TestApp, TestUser};
use gamefolio::shared::messaging::{
    Conversation, ListConversationsResponse, ListMessagesResponse, ListNotificationsResponse,
    MessageView,
};

async fn start_conversation(app: &TestApp, user: &TestUser, other: &TestUser) -> Uuid {
    let response = app
        .server
        .post("/api/chat/conversations")
        .add_header("Authorization", user.auth())
        .json(&json!({ "other_user_id": other.id }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<serde_json::Value>()["conversation_id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("conversation_id in response")
}

async fn send_text(app: &TestApp, user: &TestUser, conversation_id: Uuid, body: &str) -> Uuid {
    let response = app
        .server
        .post(&format!("/api/chat/conversations/{}/messages", conversation_id))
        .add_header("Authorization", user.auth())
        .json(&json!({ "body": body }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<serde_json::Value>()["message_id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("message_id in response")
}

async fn list_messages(app: &TestApp, user: &TestUser, conversation_id: Uuid) -> Vec<MessageView> {
    let response = app
        .server
        .get(&format!("/api/chat/conversations/{}/messages", conversation_id))
        .add_header("Authorization", user.auth())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<ListMessagesResponse>().messages
}

async fn list_conversations(app: &TestApp, user: &TestUser) -> Vec<Conversation> {
    let response = app
        .server
        .get("/api/chat/conversations")
        .add_header("Authorization", user.auth())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<ListConversationsResponse>().conversations
}

#[tokio::test]
async fn conversation_creation_is_idempotent_over_http() {
    let app = spawn_app().await;

    let first = start_conversation(&app, &app.alice, &app.bob).await;
    let second = start_conversation(&app, &app.alice, &app.bob).await;
    let from_other_side = start_conversation(&app, &app.bob, &app.alice).await;

    assert_eq!(first, second);
    assert_eq!(first, from_other_side);
}

#[tokio::test]
async fn full_message_lifecycle() {
    let app = spawn_app().await;
    let conversation_id = start_conversation(&app, &app.alice, &app.bob).await;

    // A sends "hello" -> B's unread count becomes 1
    let message_id = send_text(&app, &app.alice, conversation_id, "hello").await;

    let bobs_view = list_conversations(&app, &app.bob).await;
    assert_eq!(bobs_view.len(), 1);
    assert_eq!(bobs_view[0].last_message.as_deref(), Some("hello"));
    assert_eq!(bobs_view[0].unread_count, 1);
    assert_eq!(bobs_view[0].other.as_ref().unwrap().username, "alice");

    // B opens the conversation -> unread resets to 0
    let response = app
        .server
        .post(&format!("/api/chat/conversations/{}/read", conversation_id))
        .add_header("Authorization", app.bob.auth())
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(list_conversations(&app, &app.bob).await[0].unread_count, 0);

    // A edits -> listing shows the new text, summary unchanged
    let response = app
        .server
        .patch(&format!("/api/chat/messages/{}", message_id))
        .add_header("Authorization", app.alice.auth())
        .json(&json!({ "body": "hello there" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let messages = list_messages(&app, &app.bob, conversation_id).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].body, "hello there");
    assert!(messages[0].edited_at.is_some());
    assert_eq!(
        list_conversations(&app, &app.alice).await[0]
            .last_message
            .as_deref(),
        Some("hello")
    );

    // A deletes -> conversation is empty and the summary cleared
    let response = app
        .server
        .delete(&format!("/api/chat/messages/{}", message_id))
        .add_header("Authorization", app.alice.auth())
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    assert!(list_messages(&app, &app.alice, conversation_id).await.is_empty());
    let conversations = list_conversations(&app, &app.alice).await;
    assert!(conversations[0].last_message.is_none());
    assert!(conversations[0].last_message_at.is_none());
}

#[tokio::test]
async fn messages_are_listed_in_creation_order() {
    let app = spawn_app().await;
    let conversation_id = start_conversation(&app, &app.alice, &app.bob).await;

    for i in 0..6 {
        let sender = if i % 2 == 0 { &app.alice } else { &app.bob };
        send_text(&app, sender, conversation_id, &format!("message {}", i)).await;
    }

    let messages = list_messages(&app, &app.alice, conversation_id).await;
    assert_eq!(messages.len(), 6);
    for (i, message) in messages.iter().enumerate() {
        assert_eq!(message.body, format!("message {}", i));
    }
    for window in messages.windows(2) {
        assert!(window[0].created_at <= window[1].created_at);
    }
}

#[tokio::test]
async fn non_participants_are_rejected_everywhere() {
    let app = spawn_app().await;
    let conversation_id = start_conversation(&app, &app.alice, &app.bob).await;
    send_text(&app, &app.alice, conversation_id, "private").await;

    let list = app
        .server
        .get(&format!("/api/chat/conversations/{}/messages", conversation_id))
        .add_header("Authorization", app.carol.auth())
        .await;
    assert_eq!(list.status_code(), StatusCode::FORBIDDEN);

    let send = app
        .server
        .post(&format!("/api/chat/conversations/{}/messages", conversation_id))
        .add_header("Authorization", app.carol.auth())
        .json(&json!({ "body": "let me in" }))
        .await;
    assert_eq!(send.status_code(), StatusCode::FORBIDDEN);

    let typing = app
        .server
        .post(&format!("/api/chat/conversations/{}/typing", conversation_id))
        .add_header("Authorization", app.carol.auth())
        .json(&json!({ "is_typing": true }))
        .await;
    assert_eq!(typing.status_code(), StatusCode::FORBIDDEN);

    let subscribe = app
        .server
        .get(&format!("/api/chat/conversations/{}/subscribe", conversation_id))
        .add_header("Authorization", app.carol.auth())
        .await;
    assert_eq!(subscribe.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn only_the_author_can_edit_or_delete() {
    let app = spawn_app().await;
    let conversation_id = start_conversation(&app, &app.alice, &app.bob).await;
    let message_id = send_text(&app, &app.alice, conversation_id, "mine").await;

    let edit = app
        .server
        .patch(&format!("/api/chat/messages/{}", message_id))
        .add_header("Authorization", app.bob.auth())
        .json(&json!({ "body": "hijacked" }))
        .await;
    assert_eq!(edit.status_code(), StatusCode::FORBIDDEN);

    let delete = app
        .server
        .delete(&format!("/api/chat/messages/{}", message_id))
        .add_header("Authorization", app.bob.auth())
        .await;
    assert_eq!(delete.status_code(), StatusCode::FORBIDDEN);

    // Deleting a message that no longer exists is a quiet no-op
    let gone = app
        .server
        .delete(&format!("/api/chat/messages/{}", Uuid::new_v4()))
        .add_header("Authorization", app.bob.auth())
        .await;
    assert_eq!(gone.status_code(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let app = spawn_app().await;

    let response = app.server.get("/api/chat/conversations").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .get("/api/chat/conversations")
        .add_header("Authorization", "Bearer not-a-real-token")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unread_counts_accumulate_per_conversation() {
    let app = spawn_app().await;
    let with_bob = start_conversation(&app, &app.alice, &app.bob).await;
    let with_carol = start_conversation(&app, &app.alice, &app.carol).await;

    send_text(&app, &app.bob, with_bob, "one").await;
    send_text(&app, &app.bob, with_bob, "two").await;
    send_text(&app, &app.carol, with_carol, "three").await;

    let conversations = list_conversations(&app, &app.alice).await;
    let bob_conv = conversations.iter().find(|c| c.id == with_bob).unwrap();
    let carol_conv = conversations.iter().find(|c| c.id == with_carol).unwrap();
    assert_eq!(bob_conv.unread_count, 2);
    assert_eq!(carol_conv.unread_count, 1);

    // Reading one conversation leaves the other untouched
    app.server
        .post(&format!("/api/chat/conversations/{}/read", with_bob))
        .add_header("Authorization", app.alice.auth())
        .await;

    let conversations = list_conversations(&app, &app.alice).await;
    assert_eq!(conversations.iter().find(|c| c.id == with_bob).unwrap().unread_count, 0);
    assert_eq!(conversations.iter().find(|c| c.id == with_carol).unwrap().unread_count, 1);
}

#[tokio::test]
async fn conversation_list_sorts_by_recent_activity() {
    let app = spawn_app().await;
    let with_bob = start_conversation(&app, &app.alice, &app.bob).await;
    let with_carol = start_conversation(&app, &app.alice, &app.carol).await;

    send_text(&app, &app.alice, with_bob, "older").await;
    send_text(&app, &app.alice, with_carol, "newer").await;

    let conversations = list_conversations(&app, &app.alice).await;
    assert_eq!(conversations[0].id, with_carol);
    assert_eq!(conversations[1].id, with_bob);
}

#[tokio::test]
async fn typing_presence_appears_and_clears() {
    let app = spawn_app().await;
    let conversation_id = start_conversation(&app, &app.alice, &app.bob).await;

    app.server
        .post(&format!("/api/chat/conversations/{}/typing", conversation_id))
        .add_header("Authorization", app.alice.auth())
        .json(&json!({ "is_typing": true }))
        .await;

    let bobs_view = list_conversations(&app, &app.bob).await;
    assert_eq!(bobs_view[0].typing, vec![app.alice.id]);

    // The typist's own view does not include themselves
    let alices_view = list_conversations(&app, &app.alice).await;
    assert!(alices_view[0].typing.is_empty());

    // Sending a message clears the sender's typing entry
    send_text(&app, &app.alice, conversation_id, "done").await;
    let bobs_view = list_conversations(&app, &app.bob).await;
    assert!(bobs_view[0].typing.is_empty());
}

#[tokio::test]
async fn attachment_only_message_round_trip() {
    let app = spawn_app().await;
    let conversation_id = start_conversation(&app, &app.alice, &app.bob).await;

    // Two-phase upload
    let ticket = app
        .server
        .post("/api/storage/upload-url")
        .add_header("Authorization", app.alice.auth())
        .await
        .json::<serde_json::Value>();
    let upload_url = ticket["url"].as_str().unwrap().to_string();

    let uploaded = app
        .server
        .put(&upload_url)
        .add_header("Authorization", app.alice.auth())
        .bytes(axum::body::Bytes::from_static(b"fake png bytes"))
        .await;
    assert_eq!(uploaded.status_code(), StatusCode::OK);
    let storage_id = uploaded.json::<serde_json::Value>()["storage_id"]
        .as_str()
        .unwrap()
        .to_string();

    // Empty body + attachment is a valid message
    let response = app
        .server
        .post(&format!("/api/chat/conversations/{}/messages", conversation_id))
        .add_header("Authorization", app.alice.auth())
        .json(&json!({
            "body": "",
            "attachment": {
                "storage_id": storage_id,
                "name": "screenshot.png",
                "kind": "image"
            }
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // Summary falls back to a synthetic description
    let conversations = list_conversations(&app, &app.bob).await;
    assert_eq!(conversations[0].last_message.as_deref(), Some("Sent an image"));

    // The listing resolves the attachment to a fetchable URL
    let messages = list_messages(&app, &app.bob, conversation_id).await;
    let url = messages[0].attachment_url.as_ref().unwrap().clone();
    let blob = app
        .server
        .get(&url)
        .add_header("Authorization", app.bob.auth())
        .await;
    assert_eq!(blob.status_code(), StatusCode::OK);
    assert_eq!(blob.as_bytes().as_ref(), b"fake png bytes");
}

#[tokio::test]
async fn empty_message_without_attachment_is_rejected() {
    let app = spawn_app().await;
    let conversation_id = start_conversation(&app, &app.alice, &app.bob).await;

    let response = app
        .server
        .post(&format!("/api/chat/conversations/{}/messages", conversation_id))
        .add_header("Authorization", app.alice.auth())
        .json(&json!({ "body": "   " }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn notifications_listing_and_single_read() {
    let app = spawn_app().await;
    let conversation_id = start_conversation(&app, &app.alice, &app.bob).await;
    send_text(&app, &app.alice, conversation_id, "ping").await;
    send_text(&app, &app.alice, conversation_id, "ping again").await;

    let response = app
        .server
        .get("/api/notifications")
        .add_header("Authorization", app.bob.auth())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<ListNotificationsResponse>();
    assert_eq!(body.unread_total, 2);
    assert_eq!(body.notifications.len(), 2);
    assert!(body
        .notifications
        .iter()
        .all(|n| n.related_id == Some(conversation_id) && n.sender_id == Some(app.alice.id)));

    // Mark one read
    let first = body.notifications[0].id;
    app.server
        .post(&format!("/api/notifications/{}/read", first))
        .add_header("Authorization", app.bob.auth())
        .await;

    let body = app
        .server
        .get("/api/notifications")
        .add_header("Authorization", app.bob.auth())
        .await
        .json::<ListNotificationsResponse>();
    assert_eq!(body.unread_total, 1);
}

#[tokio::test]
async fn starting_chat_with_unknown_user_is_not_found() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/chat/conversations")
        .add_header("Authorization", app.alice.auth())
        .json(&json!({ "other_user_id": Uuid::new_v4() }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn conversation_responses_never_leak_emails() {
    let app = spawn_app().await;
    let conversation_id = start_conversation(&app, &app.alice, &app.bob).await;
    send_text(&app, &app.alice, conversation_id, "hi").await;

    let conversations = app
        .server
        .get("/api/chat/conversations")
        .add_header("Authorization", app.bob.auth())
        .await
        .text();
    assert!(!conversations.contains("@example.com"));

    let messages = app
        .server
        .get(&format!("/api/chat/conversations/{}/messages", conversation_id))
        .add_header("Authorization", app.bob.auth())
        .await
        .text();
    assert!(!messages.contains("@example.com"));
}
