//! Client Session State
//!
//! The state a chat UI renders, and the optimistic state machine
//! driving it. An outgoing message moves through:
//!
//! 1. **Composing** — text/attachment staged in the composer input
//! 2. **Pending** — on submit the input is cleared immediately and a
//!    pending record enters the outbox
//! 3. **Committed** — the acknowledgement (or the subscription echo)
//!    removes the pending record; the authoritative record takes its
//!    place in the committed list
//! 4. **Failed** — the pending record is removed and the original
//!    draft is restored into the composer for a manual retry
//!
//! Edits reuse the same optimistic-clear/restore pattern.

use std::collections::{HashMap, HashSet};

use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::client::outbox::{merge_messages, LocalMessage, Outbox, PendingMessage};
use crate::shared::event::ChatEvent;
use crate::shared::messaging::message::preview_for;
use crate::shared::messaging::{AttachmentKind, AttachmentRef, Conversation, MessageView};

/// An attachment staged locally, before upload
#[derive(Debug, Clone, PartialEq)]
pub struct StagedAttachment {
    pub bytes: Bytes,
    pub name: Option<String>,
    pub kind: AttachmentKind,
}

impl StagedAttachment {
    /// The reference this staged attachment becomes once uploaded
    pub fn as_ref_with(&self, storage_id: String) -> AttachmentRef {
        AttachmentRef {
            storage_id,
            name: self.name.clone(),
            kind: self.kind,
        }
    }
}

/// Composer input: what submit will turn into a message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub body: String,
    pub attachment: Option<StagedAttachment>,
}

impl Draft {
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty() && self.attachment.is_none()
    }

    /// The preview an optimistic send contributes to the conversation
    /// list (mirrors the server's summary rule)
    fn attachment_ref_for_preview(&self) -> Option<AttachmentRef> {
        self.attachment.as_ref().map(|staged| AttachmentRef {
            storage_id: String::new(),
            name: staged.name.clone(),
            kind: staged.kind,
        })
    }
}

/// "Currently editing" state of the composer
#[derive(Debug, Clone, PartialEq)]
pub struct EditingState {
    pub message_id: Uuid,
    pub original_body: String,
}

/// A submitted edit, held by the caller for the duration of the call
#[derive(Debug, Clone)]
pub struct EditAttempt {
    pub message_id: Uuid,
    pub new_body: String,
    pub original_body: String,
}

/// The state behind a chat UI session
pub struct ChatSessionState {
    /// The signed-in user
    pub current_user_id: Uuid,
    /// Conversations by ID
    pub conversations: HashMap<Uuid, Conversation>,
    /// Committed messages per conversation, ascending
    pub messages: HashMap<Uuid, Vec<MessageView>>,
    /// Participants currently typing, per conversation (event-driven)
    pub typing: HashMap<Uuid, HashSet<Uuid>>,
    /// In-flight optimistic messages
    pub outbox: Outbox,
    /// Composer input
    pub input: Draft,
    /// Set while the composer is editing an existing message
    pub editing: Option<EditingState>,
    /// Currently open conversation
    pub selected_conversation_id: Option<Uuid>,
    /// Transient error to surface to the user
    pub ui_error: Option<String>,
}

impl ChatSessionState {
    pub fn new(current_user_id: Uuid) -> Self {
        Self {
            current_user_id,
            conversations: HashMap::new(),
            messages: HashMap::new(),
            typing: HashMap::new(),
            outbox: Outbox::new(),
            input: Draft::default(),
            editing: None,
            selected_conversation_id: None,
            ui_error: None,
        }
    }

    /// Replace the conversation list from a server fetch
    pub fn set_conversations(&mut self, conversations: Vec<Conversation>) {
        self.conversations = conversations.into_iter().map(|c| (c.id, c)).collect();
    }

    /// Conversations sorted for display: most recent activity first
    pub fn conversation_list(&self) -> Vec<&Conversation> {
        let mut list: Vec<&Conversation> = self.conversations.values().collect();
        list.sort_by(|a, b| b.activity_at().cmp(&a.activity_at()));
        list
    }

    /// Select a conversation
    pub fn select_conversation(&mut self, conversation_id: Uuid) {
        self.selected_conversation_id = Some(conversation_id);
    }

    /// Replace a conversation's committed messages from a snapshot
    pub fn set_snapshot(&mut self, conversation_id: Uuid, messages: Vec<MessageView>) {
        self.messages.insert(conversation_id, messages);
    }

    /// The list a UI renders: committed ∪ pending, ascending
    pub fn visible_messages(&self, conversation_id: Uuid) -> Vec<LocalMessage> {
        let committed = self
            .messages
            .get(&conversation_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let pending = self.outbox.for_conversation(conversation_id);
        merge_messages(committed, &pending)
    }

    /// Participants typing in a conversation right now
    pub fn typing_users(&self, conversation_id: Uuid) -> Vec<Uuid> {
        self.typing
            .get(&conversation_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Optimistic submit: clear the input immediately and fabricate a
    /// pending record. Returns `None` when there is nothing to send or
    /// no conversation is open.
    pub fn begin_send(&mut self) -> Option<PendingMessage> {
        let conversation_id = self.selected_conversation_id?;
        if self.input.is_empty() {
            return None;
        }

        let draft = std::mem::take(&mut self.input);
        let pending = PendingMessage {
            temp_id: Uuid::new_v4(),
            conversation_id,
            draft,
            queued_at: Utc::now(),
        };
        self.outbox.push(pending.clone());

        // The optimistic copy also moves the conversation preview
        if let Some(conversation) = self.conversations.get_mut(&conversation_id) {
            conversation.last_message = Some(preview_for(
                &pending.draft.body,
                pending.draft.attachment_ref_for_preview().as_ref(),
            ));
            conversation.last_message_at = Some(pending.queued_at);
        }

        Some(pending)
    }

    /// The send was acknowledged; the authoritative record arrives (or
    /// already arrived) on the subscription.
    pub fn complete_send(&mut self, temp_id: Uuid) {
        self.outbox.remove(temp_id);
    }

    /// The send failed: remove the pending record and restore the
    /// draft into the composer so nothing the user typed is lost. If
    /// the user already started composing something new, the draft is
    /// handed back to the caller instead of overwriting their input.
    pub fn fail_send(&mut self, temp_id: Uuid, error: &str) -> Option<Draft> {
        let pending = self.outbox.remove(temp_id)?;
        self.ui_error = Some(error.to_string());

        if self.input.is_empty() {
            self.input = pending.draft;
            None
        } else {
            Some(pending.draft)
        }
    }

    /// Load a message into the composer for editing
    pub fn begin_edit(&mut self, message_id: Uuid) -> bool {
        let Some(conversation_id) = self.selected_conversation_id else {
            return false;
        };
        let Some(message) = self
            .messages
            .get(&conversation_id)
            .and_then(|msgs| msgs.iter().find(|m| m.id == message_id))
        else {
            return false;
        };
        if message.sender.id != self.current_user_id {
            return false;
        }

        self.input = Draft {
            body: message.body.clone(),
            attachment: None,
        };
        self.editing = Some(EditingState {
            message_id,
            original_body: message.body.clone(),
        });
        true
    }

    /// Optimistic edit submit: clear the input and editing state,
    /// returning what the network call needs (and what a failure must
    /// restore).
    pub fn submit_edit(&mut self) -> Option<EditAttempt> {
        let editing = self.editing.take()?;
        let new_body = std::mem::take(&mut self.input).body;
        if new_body.trim().is_empty() {
            // Nothing to submit; put the editing state back
            self.editing = Some(editing);
            return None;
        }
        Some(EditAttempt {
            message_id: editing.message_id,
            new_body,
            original_body: editing.original_body,
        })
    }

    /// The edit failed: restore the attempted text and the editing
    /// state so the user can retry.
    pub fn fail_edit(&mut self, attempt: EditAttempt, error: &str) {
        self.ui_error = Some(error.to_string());
        self.input = Draft {
            body: attempt.new_body,
            attachment: None,
        };
        self.editing = Some(EditingState {
            message_id: attempt.message_id,
            original_body: attempt.original_body,
        });
    }

    /// Apply a live event from the subscription stream
    pub fn apply_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::MessageSent {
                conversation_id,
                message,
            } => {
                // Sending clears the sender's typing signal
                if let Some(set) = self.typing.get_mut(&conversation_id) {
                    set.remove(&message.sender.id);
                }

                // Dedupe: our own echo replaces the optimistic copy
                if message.sender.id == self.current_user_id {
                    self.outbox
                        .remove_matching(conversation_id, message.body.trim());
                }

                if let Some(conversation) = self.conversations.get_mut(&conversation_id) {
                    let attachment = message.attachment_kind.map(|kind| AttachmentRef {
                        storage_id: String::new(),
                        name: message.attachment_name.clone(),
                        kind,
                    });
                    conversation.last_message =
                        Some(preview_for(&message.body, attachment.as_ref()));
                    conversation.last_message_at = Some(message.created_at);
                    if message.sender.id != self.current_user_id {
                        conversation.unread_count += 1;
                    }
                }

                let messages = self.messages.entry(conversation_id).or_default();
                if !messages.iter().any(|m| m.id == message.id) {
                    messages.push(message);
                    messages.sort_by_key(|m| m.created_at);
                }
            }
            ChatEvent::MessageEdited {
                conversation_id,
                message_id,
                body,
                edited_at,
            } => {
                if let Some(messages) = self.messages.get_mut(&conversation_id) {
                    if let Some(message) = messages.iter_mut().find(|m| m.id == message_id) {
                        message.body = body;
                        message.edited_at = Some(edited_at);
                    }
                }
            }
            ChatEvent::MessageDeleted {
                conversation_id,
                message_id,
            } => {
                if let Some(messages) = self.messages.get_mut(&conversation_id) {
                    messages.retain(|m| m.id != message_id);
                }
            }
            ChatEvent::Typing {
                conversation_id,
                user_id,
                is_typing,
            } => {
                if user_id == self.current_user_id {
                    return;
                }
                let set = self.typing.entry(conversation_id).or_default();
                if is_typing {
                    set.insert(user_id);
                } else {
                    set.remove(&user_id);
                }
            }
        }
    }

    /// Mark a conversation read locally (mirrors the server call)
    pub fn mark_read_locally(&mut self, conversation_id: Uuid) {
        if let Some(conversation) = self.conversations.get_mut(&conversation_id) {
            conversation.unread_count = 0;
        }
    }
}
