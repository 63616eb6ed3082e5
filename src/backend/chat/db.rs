//! Database operations for conversations and messages
//!
//! Two-party conversations are keyed by a canonical sorted-pair key
//! with a unique index, so creation is idempotent and lookup is O(1).
//! Every mutation enforces its own authorization: participation for
//! conversation-level operations, authorship for edit/delete.
//!
//! The conversation row carries denormalized `last_message` /
//! `last_message_at` fields so conversation lists render without a
//! join; send and delete keep them consistent.

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::backend::error::ChatError;
use crate::backend::identity::users;
use crate::backend::notifications::db as notifications_db;
use crate::backend::storage::BlobStore;
use crate::backend::time;
use crate::shared::messaging::conversation::participant_key;
use crate::shared::messaging::message::preview_for;
use crate::shared::messaging::{
    AttachmentKind, AttachmentRef, Conversation, MessageView, PublicProfile, SendMessageRequest,
    UserRole,
};

/// Get the existing two-party conversation between the pair, or create
/// it. Safe to call repeatedly and from both sides: the canonical key's
/// unique index guarantees at most one row per pair.
pub async fn get_or_create_conversation(
    pool: &SqlitePool,
    current_user: Uuid,
    other_user: Uuid,
) -> Result<Uuid, ChatError> {
    if current_user == other_user {
        return Err(ChatError::invalid(
            "other_user_id",
            "cannot start a conversation with yourself",
        ));
    }
    if users::get_user_by_id(pool, other_user).await?.is_none() {
        return Err(ChatError::not_found("user"));
    }

    let key = participant_key(current_user, other_user);

    if let Some(existing) = conversation_id_for_key(pool, &key).await? {
        return Ok(existing);
    }

    let id = Uuid::new_v4();
    let now = time::now_db();

    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        "INSERT INTO conversations (id, participant_key, last_message, last_message_at, created_at)
         VALUES (?, ?, NULL, NULL, ?)
         ON CONFLICT(participant_key) DO NOTHING",
    )
    .bind(id.to_string())
    .bind(&key)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    if inserted.rows_affected() == 0 {
        // Lost a race with the other side's identical call
        tx.rollback().await?;
        return conversation_id_for_key(pool, &key)
            .await?
            .ok_or_else(|| ChatError::not_found("conversation"));
    }

    sqlx::query(
        "INSERT INTO conversation_participants (conversation_id, user_id, joined_at)
         VALUES (?, ?, ?), (?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(current_user.to_string())
    .bind(&now)
    .bind(id.to_string())
    .bind(other_user.to_string())
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("[Chat] Created conversation {} for pair {}", id, key);
    Ok(id)
}

async fn conversation_id_for_key(
    pool: &SqlitePool,
    key: &str,
) -> Result<Option<Uuid>, ChatError> {
    let row = sqlx::query("SELECT id FROM conversations WHERE participant_key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(row.and_then(|r| Uuid::parse_str(&r.get::<String, _>("id")).ok()))
}

/// Check if a user is a participant in a conversation
pub async fn is_participant(
    pool: &SqlitePool,
    conversation_id: Uuid,
    user_id: Uuid,
) -> Result<bool, ChatError> {
    let row = sqlx::query(
        "SELECT 1 FROM conversation_participants WHERE conversation_id = ? AND user_id = ? LIMIT 1",
    )
    .bind(conversation_id.to_string())
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

/// Require participation, failing with a terminal authorization error
pub async fn require_participant(
    pool: &SqlitePool,
    conversation_id: Uuid,
    user_id: Uuid,
) -> Result<(), ChatError> {
    if is_participant(pool, conversation_id, user_id).await? {
        Ok(())
    } else {
        Err(ChatError::forbidden(
            "you are not a participant of this conversation",
        ))
    }
}

/// All participant IDs of a conversation
pub async fn participants(
    pool: &SqlitePool,
    conversation_id: Uuid,
) -> Result<Vec<Uuid>, ChatError> {
    let rows = sqlx::query(
        "SELECT user_id FROM conversation_participants WHERE conversation_id = ? ORDER BY joined_at ASC",
    )
    .bind(conversation_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .filter_map(|r| Uuid::parse_str(&r.get::<String, _>("user_id")).ok())
        .collect())
}

/// List a user's conversations, most recent activity first, enriched
/// with the other participant's public profile, the unread count, and
/// current (non-stale) typing participants.
pub async fn list_conversations_for_user(
    pool: &SqlitePool,
    user_id: Uuid,
    typing_stale_window: chrono::Duration,
) -> Result<Vec<Conversation>, ChatError> {
    let rows = sqlx::query(
        "SELECT c.id, c.last_message, c.last_message_at, c.created_at
         FROM conversations c
         JOIN conversation_participants cp ON c.id = cp.conversation_id
         WHERE cp.user_id = ?
         ORDER BY COALESCE(c.last_message_at, c.created_at) DESC",
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    let mut conversations = Vec::with_capacity(rows.len());
    for row in rows {
        let conversation_id = Uuid::parse_str(&row.get::<String, _>("id")).unwrap_or_default();

        let participant_ids = participants(pool, conversation_id).await?;

        // Two-party conversations carry the other side's profile so the
        // list renders without another round-trip
        let other = match participant_ids.len() {
            2 => match participant_ids.iter().find(|&&id| id != user_id) {
                Some(&other_id) => users::get_profile(pool, other_id).await?,
                None => None,
            },
            _ => None,
        };

        let unread_count =
            notifications_db::unread_count_for_conversation(pool, user_id, conversation_id)
                .await?;

        let typing = super::typing::typing_participants(
            pool,
            conversation_id,
            user_id,
            typing_stale_window,
        )
        .await?;

        conversations.push(Conversation {
            id: conversation_id,
            participants: participant_ids,
            other,
            last_message: row.get("last_message"),
            last_message_at: row
                .get::<Option<String>, _>("last_message_at")
                .map(|s| time::from_db(&s)),
            unread_count,
            typing,
            created_at: time::from_db(&row.get::<String, _>("created_at")),
        });
    }

    Ok(conversations)
}

/// Append a message to a conversation.
///
/// In one transaction: inserts the message, refreshes the
/// conversation's denormalized summary, and clears the sender's typing
/// entry (a send always ends "is typing", whatever the client's
/// trailing timer does). Notification fan-out and broadcasting are the
/// caller's step, after this commits.
pub async fn send_message(
    pool: &SqlitePool,
    blob: &BlobStore,
    conversation_id: Uuid,
    sender_id: Uuid,
    request: &SendMessageRequest,
) -> Result<MessageView, ChatError> {
    require_participant(pool, conversation_id, sender_id).await?;

    let body = request.body.trim();
    if body.is_empty() && request.attachment.is_none() {
        return Err(ChatError::invalid(
            "body",
            "message must have text or an attachment",
        ));
    }

    let id = Uuid::new_v4();
    let created_at = chrono::Utc::now();
    let stored_at = time::to_db(created_at);
    let preview = preview_for(body, request.attachment.as_ref());

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO messages (id, conversation_id, sender_id, body, attachment_id, attachment_name, attachment_kind, created_at, edited_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL)",
    )
    .bind(id.to_string())
    .bind(conversation_id.to_string())
    .bind(sender_id.to_string())
    .bind(body)
    .bind(request.attachment.as_ref().map(|a| a.storage_id.clone()))
    .bind(request.attachment.as_ref().and_then(|a| a.name.clone()))
    .bind(request.attachment.as_ref().map(|a| a.kind.as_str()))
    .bind(&stored_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE conversations SET last_message = ?, last_message_at = ? WHERE id = ?")
        .bind(&preview)
        .bind(&stored_at)
        .bind(conversation_id.to_string())
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM typing_presence WHERE conversation_id = ? AND user_id = ?")
        .bind(conversation_id.to_string())
        .bind(sender_id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    get_message_view(pool, blob, id).await
}

/// Replace a message body. Author-only; attachments and timestamps are
/// immutable, and the conversation summary is not touched (only send
/// and delete-of-latest move it).
pub async fn edit_message(
    pool: &SqlitePool,
    message_id: Uuid,
    editor_id: Uuid,
    new_body: &str,
) -> Result<(Uuid, chrono::DateTime<chrono::Utc>), ChatError> {
    let row = sqlx::query(
        "SELECT conversation_id, sender_id, attachment_id FROM messages WHERE id = ?",
    )
    .bind(message_id.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ChatError::not_found("message"))?;

    let sender_id = row.get::<String, _>("sender_id");
    if sender_id != editor_id.to_string() {
        return Err(ChatError::forbidden("only the author can edit a message"));
    }

    let body = new_body.trim();
    let has_attachment = row.get::<Option<String>, _>("attachment_id").is_some();
    if body.is_empty() && !has_attachment {
        return Err(ChatError::invalid("body", "message body cannot be empty"));
    }

    let edited_at = chrono::Utc::now();
    sqlx::query("UPDATE messages SET body = ?, edited_at = ? WHERE id = ?")
        .bind(body)
        .bind(time::to_db(edited_at))
        .bind(message_id.to_string())
        .execute(pool)
        .await?;

    let conversation_id =
        Uuid::parse_str(&row.get::<String, _>("conversation_id")).unwrap_or_default();
    Ok((conversation_id, edited_at))
}

/// Delete a message. Author-only; deleting an already-gone message is a
/// benign no-op (`Ok(None)`). When the deleted message was the
/// conversation's most recent, the summary is recomputed from the new
/// most recent remaining message, or cleared if none remain.
pub async fn delete_message(
    pool: &SqlitePool,
    message_id: Uuid,
    requester_id: Uuid,
) -> Result<Option<Uuid>, ChatError> {
    let row = sqlx::query("SELECT conversation_id, sender_id FROM messages WHERE id = ?")
        .bind(message_id.to_string())
        .fetch_optional(pool)
        .await?;

    let row = match row {
        Some(row) => row,
        None => return Ok(None),
    };

    if row.get::<String, _>("sender_id") != requester_id.to_string() {
        return Err(ChatError::forbidden("only the author can delete a message"));
    }
    let conversation_id =
        Uuid::parse_str(&row.get::<String, _>("conversation_id")).unwrap_or_default();

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(message_id.to_string())
        .execute(&mut *tx)
        .await?;

    // Recompute the denormalized summary from whatever is now newest
    let newest = sqlx::query(
        "SELECT body, attachment_id, attachment_name, attachment_kind, created_at
         FROM messages
         WHERE conversation_id = ?
         ORDER BY created_at DESC, rowid DESC
         LIMIT 1",
    )
    .bind(conversation_id.to_string())
    .fetch_optional(&mut *tx)
    .await?;

    let (preview, last_at) = match newest {
        Some(newest) => {
            let attachment = attachment_from_row(&newest);
            let preview = preview_for(&newest.get::<String, _>("body"), attachment.as_ref());
            (Some(preview), Some(newest.get::<String, _>("created_at")))
        }
        None => (None, None),
    };

    sqlx::query("UPDATE conversations SET last_message = ?, last_message_at = ? WHERE id = ?")
        .bind(preview)
        .bind(last_at)
        .bind(conversation_id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Some(conversation_id))
}

/// List a conversation's messages in ascending creation order, with
/// senders resolved to public profiles and attachments resolved to
/// fetchable URLs. A message whose attachment cannot be resolved comes
/// back with `attachment_url: None` — one bad blob never fails the
/// whole listing.
pub async fn list_messages(
    pool: &SqlitePool,
    blob: &BlobStore,
    conversation_id: Uuid,
    requester_id: Uuid,
) -> Result<Vec<MessageView>, ChatError> {
    require_participant(pool, conversation_id, requester_id).await?;

    let rows = sqlx::query(
        "SELECT m.id, m.conversation_id, m.sender_id, m.body,
                m.attachment_id, m.attachment_name, m.attachment_kind,
                m.created_at, m.edited_at,
                u.username, u.display_name, u.avatar_url, u.role
         FROM messages m
         JOIN users u ON m.sender_id = u.id
         WHERE m.conversation_id = ?
         ORDER BY m.created_at ASC, m.rowid ASC",
    )
    .bind(conversation_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(|row| row_to_message_view(row, blob)).collect())
}

/// Fetch a single message as a view (used after send to build the
/// broadcast payload)
pub async fn get_message_view(
    pool: &SqlitePool,
    blob: &BlobStore,
    message_id: Uuid,
) -> Result<MessageView, ChatError> {
    let row = sqlx::query(
        "SELECT m.id, m.conversation_id, m.sender_id, m.body,
                m.attachment_id, m.attachment_name, m.attachment_kind,
                m.created_at, m.edited_at,
                u.username, u.display_name, u.avatar_url, u.role
         FROM messages m
         JOIN users u ON m.sender_id = u.id
         WHERE m.id = ?",
    )
    .bind(message_id.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ChatError::not_found("message"))?;

    Ok(row_to_message_view(&row, blob))
}

fn attachment_from_row(row: &sqlx::sqlite::SqliteRow) -> Option<AttachmentRef> {
    let storage_id = row.get::<Option<String>, _>("attachment_id")?;
    let kind = row
        .get::<Option<String>, _>("attachment_kind")
        .and_then(|k| AttachmentKind::from_str(&k))
        .unwrap_or(AttachmentKind::File);
    Some(AttachmentRef {
        storage_id,
        name: row.get("attachment_name"),
        kind,
    })
}

fn row_to_message_view(row: &sqlx::sqlite::SqliteRow, blob: &BlobStore) -> MessageView {
    let attachment = attachment_from_row(row);
    let attachment_url = attachment
        .as_ref()
        .and_then(|att| blob.resolve(&att.storage_id));

    MessageView {
        id: Uuid::parse_str(&row.get::<String, _>("id")).unwrap_or_default(),
        conversation_id: Uuid::parse_str(&row.get::<String, _>("conversation_id"))
            .unwrap_or_default(),
        sender: PublicProfile {
            id: Uuid::parse_str(&row.get::<String, _>("sender_id")).unwrap_or_default(),
            username: row.get("username"),
            display_name: row.get("display_name"),
            avatar_url: row.get("avatar_url"),
            role: UserRole::from_str(&row.get::<String, _>("role")),
        },
        body: row.get("body"),
        attachment_url,
        attachment_name: attachment.as_ref().and_then(|a| a.name.clone()),
        attachment_kind: attachment.as_ref().map(|a| a.kind),
        created_at: time::from_db(&row.get::<String, _>("created_at")),
        edited_at: row
            .get::<Option<String>, _>("edited_at")
            .map(|s| time::from_db(&s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::server::config::connect_database;
    use crate::shared::messaging::UserRole;

    async fn setup() -> (SqlitePool, BlobStore, Uuid, Uuid) {
        let pool = connect_database("sqlite::memory:").await.unwrap();
        let alice = users::create_user(&pool, "alice", "alice@example.com", UserRole::Creator)
            .await
            .unwrap();
        let bob = users::create_user(&pool, "bob", "bob@example.com", UserRole::Player)
            .await
            .unwrap();
        (pool, BlobStore::new(), alice.id, bob.id)
    }

    fn text_request(body: &str) -> SendMessageRequest {
        SendMessageRequest {
            body: body.to_string(),
            attachment: None,
        }
    }

    #[tokio::test]
    async fn test_conversation_creation_is_idempotent() {
        let (pool, _blob, alice, bob) = setup().await;

        let first = get_or_create_conversation(&pool, alice, bob).await.unwrap();
        let second = get_or_create_conversation(&pool, alice, bob).await.unwrap();
        // Order-independent: same conversation from the other side
        let third = get_or_create_conversation(&pool, bob, alice).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, third);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_self_conversation_rejected() {
        let (pool, _blob, alice, _bob) = setup().await;
        let result = get_or_create_conversation(&pool, alice, alice).await;
        assert!(matches!(result, Err(ChatError::InvalidArgument { .. })));
    }

    #[tokio::test]
    async fn test_conversation_with_unknown_user_rejected() {
        let (pool, _blob, alice, _bob) = setup().await;
        let result = get_or_create_conversation(&pool, alice, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ChatError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_send_requires_participation() {
        let (pool, blob, alice, bob) = setup().await;
        let outsider =
            users::create_user(&pool, "mallory", "mallory@example.com", UserRole::Player)
                .await
                .unwrap();
        let conv = get_or_create_conversation(&pool, alice, bob).await.unwrap();

        let result = send_message(&pool, &blob, conv, outsider.id, &text_request("hi")).await;
        assert!(matches!(result, Err(ChatError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_send_updates_summary_and_clears_typing() {
        let (pool, blob, alice, bob) = setup().await;
        let conv = get_or_create_conversation(&pool, alice, bob).await.unwrap();

        super::super::typing::set_typing(&pool, conv, alice, true)
            .await
            .unwrap();

        send_message(&pool, &blob, conv, alice, &text_request("hello")).await.unwrap();

        let row = sqlx::query("SELECT last_message FROM conversations WHERE id = ?")
            .bind(conv.to_string())
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.get::<Option<String>, _>("last_message").unwrap(), "hello");

        let typing_rows: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM typing_presence WHERE conversation_id = ? AND user_id = ?",
        )
        .bind(conv.to_string())
        .bind(alice.to_string())
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(typing_rows, 0);
    }

    #[tokio::test]
    async fn test_empty_message_without_attachment_rejected() {
        let (pool, blob, alice, bob) = setup().await;
        let conv = get_or_create_conversation(&pool, alice, bob).await.unwrap();

        let result = send_message(&pool, &blob, conv, alice, &text_request("   ")).await;
        assert!(matches!(result, Err(ChatError::InvalidArgument { .. })));
    }

    #[tokio::test]
    async fn test_attachment_only_message_gets_synthetic_preview() {
        let (pool, blob, alice, bob) = setup().await;
        let conv = get_or_create_conversation(&pool, alice, bob).await.unwrap();

        let ticket = blob.create_upload();
        let storage_id = blob
            .complete_upload(ticket.upload_id, bytes::Bytes::from_static(b"img"))
            .unwrap();

        let request = SendMessageRequest {
            body: String::new(),
            attachment: Some(AttachmentRef {
                storage_id,
                name: Some("level-design.png".to_string()),
                kind: AttachmentKind::Image,
            }),
        };
        let message = send_message(&pool, &blob, conv, alice, &request).await.unwrap();
        assert!(message.attachment_url.is_some());

        let row = sqlx::query("SELECT last_message FROM conversations WHERE id = ?")
            .bind(conv.to_string())
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(
            row.get::<Option<String>, _>("last_message").unwrap(),
            "Sent an image"
        );
    }

    #[tokio::test]
    async fn test_messages_listed_in_ascending_order() {
        let (pool, blob, alice, bob) = setup().await;
        let conv = get_or_create_conversation(&pool, alice, bob).await.unwrap();

        for i in 0..5 {
            let sender = if i % 2 == 0 { alice } else { bob };
            send_message(&pool, &blob, conv, sender, &text_request(&format!("msg {}", i)))
                .await
                .unwrap();
        }

        let messages = list_messages(&pool, &blob, conv, alice).await.unwrap();
        assert_eq!(messages.len(), 5);
        for window in messages.windows(2) {
            assert!(window[0].created_at <= window[1].created_at);
        }
        assert_eq!(messages[0].body, "msg 0");
        assert_eq!(messages[4].body, "msg 4");
    }

    #[tokio::test]
    async fn test_list_requires_participation() {
        let (pool, blob, alice, bob) = setup().await;
        let outsider = users::create_user(&pool, "eve", "eve@example.com", UserRole::Player)
            .await
            .unwrap();
        let conv = get_or_create_conversation(&pool, alice, bob).await.unwrap();

        let result = list_messages(&pool, &blob, conv, outsider.id).await;
        assert!(matches!(result, Err(ChatError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_edit_is_author_only_and_body_only() {
        let (pool, blob, alice, bob) = setup().await;
        let conv = get_or_create_conversation(&pool, alice, bob).await.unwrap();
        let message = send_message(&pool, &blob, conv, alice, &text_request("hello")).await.unwrap();

        let result = edit_message(&pool, message.id, bob, "hijacked").await;
        assert!(matches!(result, Err(ChatError::Forbidden(_))));

        edit_message(&pool, message.id, alice, "hello there").await.unwrap();

        let messages = list_messages(&pool, &blob, conv, alice).await.unwrap();
        assert_eq!(messages[0].body, "hello there");
        assert!(messages[0].edited_at.is_some());

        // Summary is only moved by send and delete-of-latest
        let row = sqlx::query("SELECT last_message FROM conversations WHERE id = ?")
            .bind(conv.to_string())
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.get::<Option<String>, _>("last_message").unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_edit_missing_message_is_not_found() {
        let (pool, _blob, alice, _bob) = setup().await;
        let result = edit_message(&pool, Uuid::new_v4(), alice, "text").await;
        assert!(matches!(result, Err(ChatError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_recomputes_summary() {
        let (pool, blob, alice, bob) = setup().await;
        let conv = get_or_create_conversation(&pool, alice, bob).await.unwrap();

        send_message(&pool, &blob, conv, alice, &text_request("first")).await.unwrap();
        let latest = send_message(&pool, &blob, conv, bob, &text_request("second")).await.unwrap();

        delete_message(&pool, latest.id, bob).await.unwrap();

        let row = sqlx::query("SELECT last_message, last_message_at FROM conversations WHERE id = ?")
            .bind(conv.to_string())
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.get::<Option<String>, _>("last_message").unwrap(), "first");
        assert!(row.get::<Option<String>, _>("last_message_at").is_some());
    }

    #[tokio::test]
    async fn test_delete_last_remaining_clears_summary() {
        let (pool, blob, alice, bob) = setup().await;
        let conv = get_or_create_conversation(&pool, alice, bob).await.unwrap();
        let message = send_message(&pool, &blob, conv, alice, &text_request("only")).await.unwrap();

        delete_message(&pool, message.id, alice).await.unwrap();

        let row = sqlx::query("SELECT last_message, last_message_at FROM conversations WHERE id = ?")
            .bind(conv.to_string())
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(row.get::<Option<String>, _>("last_message").is_none());
        assert!(row.get::<Option<String>, _>("last_message_at").is_none());
        assert!(list_messages(&pool, &blob, conv, alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_author_only_but_missing_is_noop() {
        let (pool, blob, alice, bob) = setup().await;
        let conv = get_or_create_conversation(&pool, alice, bob).await.unwrap();
        let message = send_message(&pool, &blob, conv, alice, &text_request("mine")).await.unwrap();

        let result = delete_message(&pool, message.id, bob).await;
        assert!(matches!(result, Err(ChatError::Forbidden(_))));

        // Already-gone message deletes quietly
        assert_eq!(delete_message(&pool, Uuid::new_v4(), bob).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unresolvable_attachment_does_not_fail_listing() {
        let (pool, blob, alice, bob) = setup().await;
        let conv = get_or_create_conversation(&pool, alice, bob).await.unwrap();

        // Reference a blob that was never uploaded
        let request = SendMessageRequest {
            body: "broken upload".to_string(),
            attachment: Some(AttachmentRef {
                storage_id: "gone-forever".to_string(),
                name: Some("lost.png".to_string()),
                kind: AttachmentKind::Image,
            }),
        };
        send_message(&pool, &blob, conv, alice, &request).await.unwrap();
        send_message(&pool, &blob, conv, bob, &text_request("still works")).await.unwrap();

        let messages = list_messages(&pool, &blob, conv, alice).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].attachment_url.is_none());
        assert_eq!(messages[0].attachment_name.as_deref(), Some("lost.png"));
        assert_eq!(messages[1].body, "still works");
    }

    #[tokio::test]
    async fn test_list_conversations_sorted_and_enriched() {
        let (pool, blob, alice, bob) = setup().await;
        let carol = users::create_user(&pool, "carol", "carol@example.com", UserRole::Studio)
            .await
            .unwrap();

        let conv_bob = get_or_create_conversation(&pool, alice, bob).await.unwrap();
        let conv_carol = get_or_create_conversation(&pool, alice, carol.id).await.unwrap();

        // Activity in carol's conversation makes it sort first
        send_message(&pool, &blob, conv_carol, alice, &text_request("ping")).await.unwrap();

        let conversations =
            list_conversations_for_user(&pool, alice, chrono::Duration::seconds(4))
                .await
                .unwrap();
        assert_eq!(conversations.len(), 2);
        assert_eq!(conversations[0].id, conv_carol);
        assert_eq!(conversations[1].id, conv_bob);
        assert_eq!(
            conversations[0].other.as_ref().unwrap().username,
            "carol"
        );
        // Public projection only: serialized list must not leak emails
        let json = serde_json::to_string(&conversations).unwrap();
        assert!(!json.contains("carol@example.com"));
    }
}
