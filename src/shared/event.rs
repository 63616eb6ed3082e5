//! Real-time Event System
//!
//! Events broadcast to subscribers of a conversation. Modeled as a
//! tagged union so the client's apply logic is exhaustive: a new event
//! kind is a compile error at every match site, not a silently ignored
//! payload.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::messaging::MessageView;

/// A real-time event scoped to one conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A message was committed to the conversation
    MessageSent {
        conversation_id: Uuid,
        message: MessageView,
    },
    /// A message body was edited by its author
    MessageEdited {
        conversation_id: Uuid,
        message_id: Uuid,
        body: String,
        edited_at: DateTime<Utc>,
    },
    /// A message was deleted by its author
    MessageDeleted {
        conversation_id: Uuid,
        message_id: Uuid,
    },
    /// A participant started or stopped typing
    Typing {
        conversation_id: Uuid,
        user_id: Uuid,
        is_typing: bool,
    },
}

impl ChatEvent {
    /// Conversation the event belongs to
    pub fn conversation_id(&self) -> Uuid {
        match self {
            ChatEvent::MessageSent {
                conversation_id, ..
            }
            | ChatEvent::MessageEdited {
                conversation_id, ..
            }
            | ChatEvent::MessageDeleted {
                conversation_id, ..
            }
            | ChatEvent::Typing {
                conversation_id, ..
            } => *conversation_id,
        }
    }

    /// Create a typing event
    pub fn typing(conversation_id: Uuid, user_id: Uuid, is_typing: bool) -> Self {
        ChatEvent::Typing {
            conversation_id,
            user_id,
            is_typing,
        }
    }
}

/// One frame of a chat subscription stream: either the initial snapshot
/// or a live event. Serialized as one JSON object per line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum SubscriptionFrame {
    /// Full message list at subscribe time
    Snapshot { messages: Vec<MessageView> },
    /// A live event that occurred after the snapshot
    Event { event: ChatEvent },
}
