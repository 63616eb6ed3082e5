//! Notification Data Structures
//!
//! The durable notification record and the trigger contract input. The
//! messaging core creates one `message` notification per other
//! participant at send time, tagged with the conversation ID so unread
//! counts can be computed per conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A new chat message
    Message,
    /// Someone followed the recipient
    Follow,
    /// Someone upvoted the recipient's work
    Upvote,
}

impl NotificationKind {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Message => "message",
            NotificationKind::Follow => "follow",
            NotificationKind::Upvote => "upvote",
        }
    }

    /// Parse from string (database)
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "message" => Some(NotificationKind::Message),
            "follow" => Some(NotificationKind::Follow),
            "upvote" => Some(NotificationKind::Upvote),
            _ => None,
        }
    }
}

/// A notification as stored and returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationView {
    /// Unique notification ID
    pub id: Uuid,
    /// User the notification is for
    pub recipient_id: Uuid,
    /// User whose action caused it, if any
    pub sender_id: Option<Uuid>,
    /// Kind of event
    pub kind: NotificationKind,
    /// Related entity (conversation ID for `message` notifications)
    pub related_id: Option<Uuid>,
    /// Whether the recipient has read it
    pub is_read: bool,
    /// When it was created
    pub created_at: DateTime<Utc>,
}

/// Response for listing a user's notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListNotificationsResponse {
    pub notifications: Vec<NotificationView>,
    pub unread_total: i64,
}
