//! Database operations for notifications
//!
//! Durable notification rows and the unread-count queries built on
//! them. `message` notifications carry the conversation ID as
//! `related_id`, which is what makes per-conversation unread counting
//! possible without touching the messages table.

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::backend::time;
use crate::shared::messaging::{NotificationKind, NotificationView};

/// Insert a durable notification row
pub async fn insert_notification(
    pool: &SqlitePool,
    recipient_id: Uuid,
    sender_id: Option<Uuid>,
    kind: NotificationKind,
    related_id: Option<Uuid>,
) -> Result<NotificationView, sqlx::Error> {
    let id = Uuid::new_v4();
    let created_at = chrono::Utc::now();

    sqlx::query(
        "INSERT INTO notifications (id, recipient_id, sender_id, kind, related_id, is_read, created_at)
         VALUES (?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(id.to_string())
    .bind(recipient_id.to_string())
    .bind(sender_id.map(|s| s.to_string()))
    .bind(kind.as_str())
    .bind(related_id.map(|r| r.to_string()))
    .bind(time::to_db(created_at))
    .execute(pool)
    .await?;

    Ok(NotificationView {
        id,
        recipient_id,
        sender_id,
        kind,
        related_id,
        is_read: false,
        created_at,
    })
}

/// List a user's notifications, newest first
pub async fn list_notifications_for_user(
    pool: &SqlitePool,
    user_id: Uuid,
) -> Result<Vec<NotificationView>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT id, recipient_id, sender_id, kind, related_id, is_read, created_at
         FROM notifications
         WHERE recipient_id = ?
         ORDER BY created_at DESC",
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row_to_notification(&row)).collect())
}

/// Total unread notifications for a user
pub async fn unread_total(pool: &SqlitePool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE recipient_id = ? AND is_read = 0",
    )
    .bind(user_id.to_string())
    .fetch_one(pool)
    .await
}

/// Unread `message` notifications for one conversation
pub async fn unread_count_for_conversation(
    pool: &SqlitePool,
    user_id: Uuid,
    conversation_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*)
         FROM notifications
         WHERE recipient_id = ? AND kind = 'message' AND related_id = ? AND is_read = 0",
    )
    .bind(user_id.to_string())
    .bind(conversation_id.to_string())
    .fetch_one(pool)
    .await
}

/// Mark all `message` notifications of a conversation read for a user.
///
/// This is what "opening" a conversation does; it resets that
/// conversation's unread count to zero.
pub async fn mark_conversation_read(
    pool: &SqlitePool,
    user_id: Uuid,
    conversation_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE notifications
         SET is_read = 1
         WHERE recipient_id = ? AND kind = 'message' AND related_id = ? AND is_read = 0",
    )
    .bind(user_id.to_string())
    .bind(conversation_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Mark a single notification read
pub async fn mark_read(
    pool: &SqlitePool,
    notification_id: Uuid,
    user_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND recipient_id = ?")
        .bind(notification_id.to_string())
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

fn row_to_notification(row: &sqlx::sqlite::SqliteRow) -> NotificationView {
    NotificationView {
        id: Uuid::parse_str(&row.get::<String, _>("id")).unwrap_or_default(),
        recipient_id: Uuid::parse_str(&row.get::<String, _>("recipient_id")).unwrap_or_default(),
        sender_id: row
            .get::<Option<String>, _>("sender_id")
            .and_then(|s| Uuid::parse_str(&s).ok()),
        kind: NotificationKind::from_str(&row.get::<String, _>("kind"))
            .unwrap_or(NotificationKind::Message),
        related_id: row
            .get::<Option<String>, _>("related_id")
            .and_then(|s| Uuid::parse_str(&s).ok()),
        is_read: row.get::<i64, _>("is_read") != 0,
        created_at: time::from_db(&row.get::<String, _>("created_at")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::server::config::connect_database;

    #[tokio::test]
    async fn test_insert_and_count() {
        let pool = connect_database("sqlite::memory:").await.unwrap();
        let recipient = Uuid::new_v4();
        let sender = Uuid::new_v4();
        let conversation = Uuid::new_v4();

        insert_notification(
            &pool,
            recipient,
            Some(sender),
            NotificationKind::Message,
            Some(conversation),
        )
        .await
        .unwrap();

        assert_eq!(
            unread_count_for_conversation(&pool, recipient, conversation)
                .await
                .unwrap(),
            1
        );
        assert_eq!(unread_total(&pool, recipient).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_conversation_read_resets_count() {
        let pool = connect_database("sqlite::memory:").await.unwrap();
        let recipient = Uuid::new_v4();
        let conversation = Uuid::new_v4();

        for _ in 0..3 {
            insert_notification(
                &pool,
                recipient,
                None,
                NotificationKind::Message,
                Some(conversation),
            )
            .await
            .unwrap();
        }

        let cleared = mark_conversation_read(&pool, recipient, conversation)
            .await
            .unwrap();
        assert_eq!(cleared, 3);
        assert_eq!(
            unread_count_for_conversation(&pool, recipient, conversation)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_read_scope_is_per_conversation() {
        let pool = connect_database("sqlite::memory:").await.unwrap();
        let recipient = Uuid::new_v4();
        let conv_a = Uuid::new_v4();
        let conv_b = Uuid::new_v4();

        insert_notification(&pool, recipient, None, NotificationKind::Message, Some(conv_a))
            .await
            .unwrap();
        insert_notification(&pool, recipient, None, NotificationKind::Message, Some(conv_b))
            .await
            .unwrap();

        mark_conversation_read(&pool, recipient, conv_a).await.unwrap();

        assert_eq!(
            unread_count_for_conversation(&pool, recipient, conv_a)
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            unread_count_for_conversation(&pool, recipient, conv_b)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_list_notifications_newest_first() {
        let pool = connect_database("sqlite::memory:").await.unwrap();
        let recipient = Uuid::new_v4();

        let first = insert_notification(&pool, recipient, None, NotificationKind::Follow, None)
            .await
            .unwrap();
        let second =
            insert_notification(&pool, recipient, None, NotificationKind::Upvote, None)
                .await
                .unwrap();

        let listed = list_notifications_for_user(&pool, recipient).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }
}
