//! Optimistic Outbox
//!
//! Locally fabricated pending messages and the merge rule that overlays
//! them on the committed stream. A pending record exists from the
//! moment of an optimistic submit until the server acknowledges the
//! send (or its echo arrives on the subscription), or until the send
//! fails and the draft is restored.
//!
//! Pending and committed records are distinct variants of a sum type so
//! the merge/dedupe logic is exhaustive by construction.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::client::state::Draft;
use crate::shared::messaging::MessageView;

/// A not-yet-confirmed outgoing message
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMessage {
    /// Temporary local ID; never leaves this process
    pub temp_id: Uuid,
    /// Conversation the message was composed in
    pub conversation_id: Uuid,
    /// The submitted draft, kept verbatim for rollback
    pub draft: Draft,
    /// Client-clock submit time; used only for display ordering
    pub queued_at: DateTime<Utc>,
}

/// One entry of the merged, renderable message list
#[derive(Debug, Clone, PartialEq)]
pub enum LocalMessage {
    /// Optimistic, not yet confirmed by the server
    Pending(PendingMessage),
    /// Confirmed by the server
    Committed(MessageView),
}

impl LocalMessage {
    /// Timestamp used for display ordering. Pending entries use the
    /// client clock, committed entries the server clock; strict
    /// monotonicity across that boundary is not guaranteed and nothing
    /// ordering-sensitive may rely on it.
    pub fn display_time(&self) -> DateTime<Utc> {
        match self {
            LocalMessage::Pending(pending) => pending.queued_at,
            LocalMessage::Committed(message) => message.created_at,
        }
    }

    /// Whether this entry is still awaiting confirmation
    pub fn is_pending(&self) -> bool {
        matches!(self, LocalMessage::Pending(_))
    }
}

/// The set of in-flight optimistic messages
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<PendingMessage>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pending record at submit time
    pub fn push(&mut self, pending: PendingMessage) {
        self.pending.push(pending);
    }

    /// Remove a pending record by its temporary ID, returning it (for
    /// rollback, the caller gets the original draft back)
    pub fn remove(&mut self, temp_id: Uuid) -> Option<PendingMessage> {
        let index = self.pending.iter().position(|p| p.temp_id == temp_id)?;
        Some(self.pending.remove(index))
    }

    /// Drop the oldest pending record matching the echoed committed
    /// message (same conversation, same body). Used when the
    /// authoritative record arrives on the subscription before the
    /// send call's own acknowledgement.
    pub fn remove_matching(&mut self, conversation_id: Uuid, body: &str) -> Option<PendingMessage> {
        let index = self
            .pending
            .iter()
            .position(|p| p.conversation_id == conversation_id && p.draft.body.trim() == body)?;
        Some(self.pending.remove(index))
    }

    /// Pending records for one conversation
    pub fn for_conversation(&self, conversation_id: Uuid) -> Vec<&PendingMessage> {
        self.pending
            .iter()
            .filter(|p| p.conversation_id == conversation_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Merge rule for rendering: committed messages ∪ pending messages,
/// ascending by display time. The sort is stable, and pending entries
/// sort after committed entries at equal timestamps, so an echo landing
/// with the same clock value never jumps above its optimistic twin.
pub fn merge_messages(
    committed: &[MessageView],
    pending: &[&PendingMessage],
) -> Vec<LocalMessage> {
    let mut merged: Vec<LocalMessage> = committed
        .iter()
        .cloned()
        .map(LocalMessage::Committed)
        .collect();
    merged.extend(pending.iter().map(|p| LocalMessage::Pending((*p).clone())));

    merged.sort_by_key(|m| (m.display_time(), m.is_pending()));
    merged
}
