//! Conversation Data Structures
//!
//! Represents a conversation between two or more users, plus the
//! canonical participant key that makes two-party conversation creation
//! idempotent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::PublicProfile;

/// A conversation as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: Uuid,
    /// Participant user IDs
    pub participants: Vec<Uuid>,
    /// Public profile of the other participant (two-party conversations)
    pub other: Option<PublicProfile>,
    /// Denormalized preview of the most recent message
    pub last_message: Option<String>,
    /// Timestamp of the most recent message
    pub last_message_at: Option<DateTime<Utc>>,
    /// Unread message notifications for the requesting user
    pub unread_count: i64,
    /// Participants currently typing (stale entries already filtered),
    /// excluding the requesting user
    pub typing: Vec<Uuid>,
    /// When the conversation was created
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Check if a user is a participant
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.participants.contains(&user_id)
    }

    /// Get the other participant (for two-party conversations)
    pub fn other_participant(&self, current_user_id: Uuid) -> Option<Uuid> {
        self.participants
            .iter()
            .find(|&&id| id != current_user_id)
            .copied()
    }

    /// Sort key for a user's conversation list: most recent activity
    /// first, falling back to creation time for empty conversations.
    pub fn activity_at(&self) -> DateTime<Utc> {
        self.last_message_at.unwrap_or(self.created_at)
    }
}

/// Canonical key for a two-party conversation.
///
/// Order-independent: `participant_key(a, b) == participant_key(b, a)`.
/// A unique index on this key is what makes `get_or_create` idempotent
/// without scanning the conversations table.
pub fn participant_key(a: Uuid, b: Uuid) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{}:{}", lo, hi)
}

/// Request to start (or resume) a conversation with another user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartConversationRequest {
    pub other_user_id: Uuid,
}

/// Response after starting a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartConversationResponse {
    pub conversation_id: Uuid,
}

/// Response for listing conversations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConversationsResponse {
    pub conversations: Vec<Conversation>,
}

/// Typing signal sent by a participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingRequest {
    pub is_typing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_key_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(participant_key(a, b), participant_key(b, a));
    }

    #[test]
    fn test_participant_key_distinct_pairs_differ() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        assert_ne!(participant_key(a, b), participant_key(a, c));
    }

    #[test]
    fn test_other_participant() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let conv = Conversation {
            id: Uuid::new_v4(),
            participants: vec![a, b],
            other: None,
            last_message: None,
            last_message_at: None,
            unread_count: 0,
            typing: Vec::new(),
            created_at: Utc::now(),
        };
        assert_eq!(conv.other_participant(a), Some(b));
        assert_eq!(conv.other_participant(b), Some(a));
        assert!(conv.has_participant(a));
        assert!(!conv.has_participant(Uuid::new_v4()));
    }

    #[test]
    fn test_activity_falls_back_to_created_at() {
        let created = Utc::now();
        let mut conv = Conversation {
            id: Uuid::new_v4(),
            participants: vec![Uuid::new_v4(), Uuid::new_v4()],
            other: None,
            last_message: None,
            last_message_at: None,
            unread_count: 0,
            typing: Vec::new(),
            created_at: created,
        };
        assert_eq!(conv.activity_at(), created);
        let later = created + chrono::Duration::minutes(5);
        conv.last_message_at = Some(later);
        assert_eq!(conv.activity_at(), later);
    }
}
