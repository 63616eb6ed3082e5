//! Message Data Structures
//!
//! Represents a message in a conversation, its optional attachment, and
//! the request/response DTOs for the message endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::PublicProfile;

/// Kind of attached binary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    /// Inline-rendered image
    Image,
    /// Generic downloadable file
    File,
}

impl AttachmentKind {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentKind::Image => "image",
            AttachmentKind::File => "file",
        }
    }

    /// Parse from string (database)
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "image" => Some(AttachmentKind::Image),
            "file" => Some(AttachmentKind::File),
            _ => None,
        }
    }
}

/// Opaque reference to an uploaded blob, as stored on a message.
///
/// The `storage_id` comes out of the two-phase upload flow; the blob
/// store resolves it to a fetchable URL at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentRef {
    /// Opaque blob handle returned by the storage upload
    pub storage_id: String,
    /// Display name (original filename), if any
    pub name: Option<String>,
    /// Kind of the attached binary
    pub kind: AttachmentKind,
}

/// A message as returned to clients, with the sender resolved to their
/// public profile and the attachment resolved to a fetchable URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageView {
    /// Unique message ID
    pub id: Uuid,
    /// Conversation this message belongs to
    pub conversation_id: Uuid,
    /// Public profile of the author
    pub sender: PublicProfile,
    /// Message body (may be empty when an attachment is present)
    pub body: String,
    /// Fetchable URL of the attachment; `None` when there is no
    /// attachment or when resolution failed for this message
    pub attachment_url: Option<String>,
    /// Display name of the attachment
    pub attachment_name: Option<String>,
    /// Kind of the attachment
    pub attachment_kind: Option<AttachmentKind>,
    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
    /// Set when the author edited the body
    pub edited_at: Option<DateTime<Utc>>,
}

/// Compute the denormalized conversation preview for a message.
///
/// A message with an empty body but an attachment gets a synthetic
/// description so conversation lists still have something to render.
pub fn preview_for(body: &str, attachment: Option<&AttachmentRef>) -> String {
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return truncate_preview(trimmed, 80);
    }
    match attachment {
        Some(att) => match att.kind {
            AttachmentKind::Image => "Sent an image".to_string(),
            AttachmentKind::File => match &att.name {
                Some(name) => format!("Sent: {}", name),
                None => "Sent a file".to_string(),
            },
        },
        None => String::new(),
    }
}

/// Truncate a preview to at most `max_len` characters, ellipsized.
fn truncate_preview(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let mut preview: String = text.chars().take(max_len.saturating_sub(3)).collect();
        preview.push_str("...");
        preview
    }
}

/// Request to send a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
    #[serde(default)]
    pub attachment: Option<AttachmentRef>,
}

/// Response after sending a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message_id: Uuid,
}

/// Request to edit a message body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditMessageRequest {
    pub body: String,
}

/// Response for listing messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMessagesResponse {
    pub messages: Vec<MessageView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_ref() -> AttachmentRef {
        AttachmentRef {
            storage_id: "blob-1".to_string(),
            name: Some("screenshot.png".to_string()),
            kind: AttachmentKind::Image,
        }
    }

    #[test]
    fn test_preview_uses_body_when_present() {
        assert_eq!(preview_for("hello", Some(&image_ref())), "hello");
    }

    #[test]
    fn test_preview_falls_back_for_image() {
        assert_eq!(preview_for("", Some(&image_ref())), "Sent an image");
        assert_eq!(preview_for("   ", Some(&image_ref())), "Sent an image");
    }

    #[test]
    fn test_preview_falls_back_for_file() {
        let file = AttachmentRef {
            storage_id: "blob-2".to_string(),
            name: Some("design.pdf".to_string()),
            kind: AttachmentKind::File,
        };
        assert_eq!(preview_for("", Some(&file)), "Sent: design.pdf");

        let unnamed = AttachmentRef { name: None, ..file };
        assert_eq!(preview_for("", Some(&unnamed)), "Sent a file");
    }

    #[test]
    fn test_preview_truncates_long_bodies() {
        let long = "x".repeat(200);
        let preview = preview_for(&long, None);
        assert_eq!(preview.chars().count(), 80);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_attachment_kind_round_trip() {
        for kind in [AttachmentKind::Image, AttachmentKind::File] {
            assert_eq!(AttachmentKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(AttachmentKind::from_str("video"), None);
    }
}
