//! Typing Presence
//!
//! Short-lived, self-expiring typing signals. Each participant owns at
//! most one row per conversation, keyed by their own user ID, so
//! keystroke-rate refreshes never grow the table and participants never
//! overwrite each other.
//!
//! There is no background sweeper: reads filter by the staleness window
//! and lazily delete whatever has expired.

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::backend::error::ChatError;
use crate::backend::time;

/// Record or clear a participant's typing signal.
///
/// `is_typing = true` stamps the row with the current time (insert or
/// refresh); `false` removes it. Callable at keystroke frequency.
pub async fn set_typing(
    pool: &SqlitePool,
    conversation_id: Uuid,
    user_id: Uuid,
    is_typing: bool,
) -> Result<(), ChatError> {
    super::db::require_participant(pool, conversation_id, user_id).await?;

    if is_typing {
        sqlx::query(
            "INSERT INTO typing_presence (conversation_id, user_id, refreshed_at)
             VALUES (?, ?, ?)
             ON CONFLICT(conversation_id, user_id) DO UPDATE SET refreshed_at = excluded.refreshed_at",
        )
        .bind(conversation_id.to_string())
        .bind(user_id.to_string())
        .bind(time::now_db())
        .execute(pool)
        .await?;
    } else {
        sqlx::query("DELETE FROM typing_presence WHERE conversation_id = ? AND user_id = ?")
            .bind(conversation_id.to_string())
            .bind(user_id.to_string())
            .execute(pool)
            .await?;
    }

    Ok(())
}

/// Participants currently typing in a conversation, excluding the
/// viewer. Entries older than `stale_window` are ignored and lazily
/// deleted.
pub async fn typing_participants(
    pool: &SqlitePool,
    conversation_id: Uuid,
    viewer: Uuid,
    stale_window: chrono::Duration,
) -> Result<Vec<Uuid>, ChatError> {
    let cutoff = time::to_db(chrono::Utc::now() - stale_window);

    // Lazy expiry: anything past the window is dead weight
    sqlx::query("DELETE FROM typing_presence WHERE conversation_id = ? AND refreshed_at < ?")
        .bind(conversation_id.to_string())
        .bind(&cutoff)
        .execute(pool)
        .await?;

    let rows = sqlx::query(
        "SELECT user_id FROM typing_presence
         WHERE conversation_id = ? AND user_id != ?",
    )
    .bind(conversation_id.to_string())
    .bind(viewer.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .filter_map(|r| Uuid::parse_str(&r.get::<String, _>("user_id")).ok())
        .collect())
}
