//! Messaging Types
//!
//! Shared data structures for the messaging core: conversations,
//! messages, notifications, and the public profile projection attached
//! to both.

/// Public profile projection of a platform user
pub mod profile;

/// Message views, attachments, and request/response DTOs
pub mod message;

/// Conversation views and the canonical participant key
pub mod conversation;

/// Notification records and the trigger contract input
pub mod notification;

pub use conversation::{
    Conversation, ListConversationsResponse, StartConversationRequest,
    StartConversationResponse, TypingRequest,
};
pub use message::{
    AttachmentKind, AttachmentRef, EditMessageRequest, ListMessagesResponse, MessageView,
    SendMessageRequest, SendMessageResponse,
};
pub use notification::{ListNotificationsResponse, NotificationKind, NotificationView};
pub use profile::{PublicProfile, UserRole};
