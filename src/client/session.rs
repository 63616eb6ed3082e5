//! Chat Client Driver
//!
//! Ties the API client, the session state machine, and the typing
//! debouncer together: every user action becomes an optimistic state
//! transition plus a network call, with rollback on failure.

use std::time::Instant;

use uuid::Uuid;

use crate::client::api::ChatApiClient;
use crate::client::outbox::PendingMessage;
use crate::client::state::ChatSessionState;
use crate::client::typing::{TypingDebouncer, TypingSignal};
use crate::client::ClientError;
use crate::shared::event::SubscriptionFrame;

/// A signed-in chat client session
pub struct ChatClient {
    pub api: ChatApiClient,
    pub state: ChatSessionState,
    pub typing: TypingDebouncer,
}

impl ChatClient {
    pub fn new(api: ChatApiClient, current_user_id: Uuid) -> Self {
        Self {
            api,
            state: ChatSessionState::new(current_user_id),
            typing: TypingDebouncer::default(),
        }
    }

    /// Refresh the conversation list from the server
    pub async fn refresh_conversations(&mut self) -> Result<(), ClientError> {
        let conversations = self.api.list_conversations().await?;
        self.state.set_conversations(conversations);
        Ok(())
    }

    /// Start (or resume) a chat with another user and open it
    pub async fn open_conversation_with(
        &mut self,
        other_user_id: Uuid,
    ) -> Result<Uuid, ClientError> {
        let conversation_id = self.api.start_conversation(other_user_id).await?;
        self.open_conversation(conversation_id).await?;
        Ok(conversation_id)
    }

    /// Open a conversation: load its messages, select it, and mark it
    /// read (resetting the unread count on both sides)
    pub async fn open_conversation(&mut self, conversation_id: Uuid) -> Result<(), ClientError> {
        let messages = self.api.list_messages(conversation_id).await?;
        self.state.set_snapshot(conversation_id, messages);
        self.state.select_conversation(conversation_id);

        self.api.mark_conversation_read(conversation_id).await?;
        self.state.mark_read_locally(conversation_id);
        Ok(())
    }

    /// Submit the composer draft: optimistic clear, pending record,
    /// attachment upload, then the send call. On any failure the
    /// pending record is rolled back and the draft restored.
    pub async fn send_current_draft(&mut self) -> Result<Uuid, ClientError> {
        let pending = self
            .state
            .begin_send()
            .ok_or_else(|| ClientError::InvalidDraft("nothing to send".to_string()))?;

        // A send ends "is typing" server-side; cancel the trailing timer
        self.typing.message_sent();

        match self.transmit(&pending).await {
            Ok(message_id) => {
                self.state.complete_send(pending.temp_id);
                Ok(message_id)
            }
            Err(e) => {
                self.state.fail_send(pending.temp_id, &e.to_string());
                Err(e)
            }
        }
    }

    /// Upload the attachment (if any), then issue the send
    async fn transmit(&self, pending: &PendingMessage) -> Result<Uuid, ClientError> {
        let attachment = match &pending.draft.attachment {
            Some(staged) => Some(
                self.api
                    .upload_attachment(staged.bytes.clone(), staged.name.clone(), staged.kind)
                    .await?,
            ),
            None => None,
        };

        self.api
            .send_message(pending.conversation_id, &pending.draft.body, attachment)
            .await
    }

    /// Submit an in-progress edit with the same clear/restore pattern
    pub async fn submit_edit(&mut self) -> Result<(), ClientError> {
        let attempt = self
            .state
            .submit_edit()
            .ok_or_else(|| ClientError::InvalidDraft("no edit in progress".to_string()))?;

        match self
            .api
            .edit_message(attempt.message_id, &attempt.new_body)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state.fail_edit(attempt, &e.to_string());
                Err(e)
            }
        }
    }

    /// Delete one of the user's own messages
    pub async fn delete_message(&mut self, message_id: Uuid) -> Result<(), ClientError> {
        self.api.delete_message(message_id).await
    }

    /// Record a keystroke in the open conversation. The first
    /// keystroke of a burst sends `is_typing = true` immediately;
    /// the trailing `false` comes from `tick_typing`.
    pub async fn on_keystroke(&mut self) {
        let Some(conversation_id) = self.state.selected_conversation_id else {
            return;
        };
        if let Some(TypingSignal::Start) = self.typing.keystroke(Instant::now()) {
            // Typing presence is best-effort; a lost signal self-heals
            if let Err(e) = self.api.set_typing(conversation_id, true).await {
                tracing::debug!("[Client] Typing signal failed: {}", e);
            }
        }
    }

    /// Drive the trailing edge of the typing debouncer. Call
    /// periodically (e.g. from the UI tick).
    pub async fn tick_typing(&mut self) {
        let Some(conversation_id) = self.state.selected_conversation_id else {
            return;
        };
        if let Some(TypingSignal::Stop) = self.typing.poll(Instant::now()) {
            if let Err(e) = self.api.set_typing(conversation_id, false).await {
                tracing::debug!("[Client] Typing signal failed: {}", e);
            }
        }
    }

    /// Apply a subscription frame to local state
    pub fn apply_frame(&mut self, conversation_id: Uuid, frame: SubscriptionFrame) {
        match frame {
            SubscriptionFrame::Snapshot { messages } => {
                self.state.set_snapshot(conversation_id, messages);
            }
            SubscriptionFrame::Event { event } => {
                self.state.apply_event(event);
            }
        }
    }
}
