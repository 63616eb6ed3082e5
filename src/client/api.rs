//! Chat API Client
//!
//! Async HTTP client for the messaging server, one method per boundary
//! operation. Status codes map onto `ClientError` so callers can tell
//! terminal failures (permission, not-found) from recoverable transport
//! errors.

use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use uuid::Uuid;

use crate::client::{ClientError, Config};
use crate::shared::event::SubscriptionFrame;
use crate::shared::messaging::{
    AttachmentKind, AttachmentRef, Conversation, EditMessageRequest, ListConversationsResponse,
    ListMessagesResponse, ListNotificationsResponse, MessageView, SendMessageRequest,
    SendMessageResponse, StartConversationRequest, StartConversationResponse, TypingRequest,
};

/// Upload ticket returned by phase one of the storage flow
#[derive(Debug, serde::Deserialize)]
struct UploadTicket {
    upload_id: Uuid,
    url: String,
}

/// Result of phase two
#[derive(Debug, serde::Deserialize)]
struct UploadComplete {
    storage_id: String,
}

/// A live subscription: newline-delimited JSON frames decoded off the
/// response body. Blank keep-alive lines are skipped.
pub struct SubscriptionStream {
    inner: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    buffer: Vec<u8>,
}

impl SubscriptionStream {
    /// Next frame, or `None` when the server closed the stream
    pub async fn next_frame(&mut self) -> Result<Option<SubscriptionFrame>, ClientError> {
        loop {
            // Drain complete lines already buffered
            while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.buffer.drain(..=pos).collect();
                let line = &line[..line.len() - 1];
                if line.iter().all(|b| b.is_ascii_whitespace()) {
                    continue; // heartbeat
                }
                let frame = serde_json::from_slice(line)
                    .map_err(|e| ClientError::Protocol(format!("Bad frame: {}", e)))?;
                return Ok(Some(frame));
            }

            match self.inner.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => return Err(ClientError::Network(e.to_string())),
                None => return Ok(None),
            }
        }
    }
}

/// HTTP client for the messaging API
pub struct ChatApiClient {
    config: Config,
    client: Client,
}

impl ChatApiClient {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.config.get_token().ok_or(ClientError::Unauthorized)?;
        Ok(builder.header("Authorization", format!("Bearer {}", token)))
    }

    async fn check(&self, response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_else(|_| status.to_string());
        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Permission(detail),
            StatusCode::NOT_FOUND => ClientError::NotFound(detail),
            _ => ClientError::Protocol(format!("{}: {}", status, detail)),
        })
    }

    /// Start (or resume) a conversation with another user
    pub async fn start_conversation(&self, other_user_id: Uuid) -> Result<Uuid, ClientError> {
        let url = self.config.api_url("/api/chat/conversations");
        let request = StartConversationRequest { other_user_id };

        let response = self
            .authed(self.client.post(&url))?
            .json(&request)
            .send()
            .await?;
        let response = self.check(response).await?;

        let body: StartConversationResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Protocol(format!("Failed to parse response: {}", e)))?;
        Ok(body.conversation_id)
    }

    /// List the current user's conversations
    pub async fn list_conversations(&self) -> Result<Vec<Conversation>, ClientError> {
        let url = self.config.api_url("/api/chat/conversations");

        let response = self.authed(self.client.get(&url))?.send().await?;
        let response = self.check(response).await?;

        let body: ListConversationsResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Protocol(format!("Failed to parse response: {}", e)))?;
        Ok(body.conversations)
    }

    /// List a conversation's messages, ascending
    pub async fn list_messages(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<MessageView>, ClientError> {
        let url = self
            .config
            .api_url(&format!("/api/chat/conversations/{}/messages", conversation_id));

        let response = self.authed(self.client.get(&url))?.send().await?;
        let response = self.check(response).await?;

        let body: ListMessagesResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Protocol(format!("Failed to parse response: {}", e)))?;
        Ok(body.messages)
    }

    /// Send a message; returns the server-assigned message ID
    pub async fn send_message(
        &self,
        conversation_id: Uuid,
        body: &str,
        attachment: Option<AttachmentRef>,
    ) -> Result<Uuid, ClientError> {
        let url = self
            .config
            .api_url(&format!("/api/chat/conversations/{}/messages", conversation_id));
        let request = SendMessageRequest {
            body: body.to_string(),
            attachment,
        };

        let response = self
            .authed(self.client.post(&url))?
            .json(&request)
            .send()
            .await?;
        let response = self.check(response).await?;

        let body: SendMessageResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Protocol(format!("Failed to parse response: {}", e)))?;
        Ok(body.message_id)
    }

    /// Edit a message body (author only)
    pub async fn edit_message(&self, message_id: Uuid, body: &str) -> Result<(), ClientError> {
        let url = self
            .config
            .api_url(&format!("/api/chat/messages/{}", message_id));
        let request = EditMessageRequest {
            body: body.to_string(),
        };

        let response = self
            .authed(self.client.patch(&url))?
            .json(&request)
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    /// Delete a message (author only)
    pub async fn delete_message(&self, message_id: Uuid) -> Result<(), ClientError> {
        let url = self
            .config
            .api_url(&format!("/api/chat/messages/{}", message_id));

        let response = self.authed(self.client.delete(&url))?.send().await?;
        self.check(response).await?;
        Ok(())
    }

    /// Send a typing signal
    pub async fn set_typing(
        &self,
        conversation_id: Uuid,
        is_typing: bool,
    ) -> Result<(), ClientError> {
        let url = self
            .config
            .api_url(&format!("/api/chat/conversations/{}/typing", conversation_id));

        let response = self
            .authed(self.client.post(&url))?
            .json(&TypingRequest { is_typing })
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    /// Mark a conversation read, resetting its unread count
    pub async fn mark_conversation_read(
        &self,
        conversation_id: Uuid,
    ) -> Result<(), ClientError> {
        let url = self
            .config
            .api_url(&format!("/api/chat/conversations/{}/read", conversation_id));

        let response = self.authed(self.client.post(&url))?.send().await?;
        self.check(response).await?;
        Ok(())
    }

    /// List the current user's notifications
    pub async fn notifications(&self) -> Result<ListNotificationsResponse, ClientError> {
        let url = self.config.api_url("/api/notifications");

        let response = self.authed(self.client.get(&url))?.send().await?;
        let response = self.check(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::Protocol(format!("Failed to parse response: {}", e)))
    }

    /// Open a streaming subscription to a conversation. The first
    /// frame is a snapshot; every later frame is a live event.
    pub async fn subscribe(
        &self,
        conversation_id: Uuid,
    ) -> Result<SubscriptionStream, ClientError> {
        let url = self
            .config
            .api_url(&format!("/api/chat/conversations/{}/subscribe", conversation_id));

        let response = self.authed(self.client.get(&url))?.send().await?;
        let response = self.check(response).await?;

        Ok(SubscriptionStream {
            inner: Box::pin(response.bytes_stream()),
            buffer: Vec::new(),
        })
    }

    /// Upload an attachment via the two-phase storage flow: obtain a
    /// write-once upload URL, PUT the bytes, keep the opaque reference.
    pub async fn upload_attachment(
        &self,
        bytes: Bytes,
        name: Option<String>,
        kind: AttachmentKind,
    ) -> Result<AttachmentRef, ClientError> {
        // Phase one: the ticket
        let url = self.config.api_url("/api/storage/upload-url");
        let response = self.authed(self.client.post(&url))?.send().await?;
        let response = self.check(response).await?;
        let ticket: UploadTicket = response
            .json()
            .await
            .map_err(|e| ClientError::Protocol(format!("Failed to parse response: {}", e)))?;

        // Phase two: the bytes go to the ticket's URL
        let put_url = self.config.api_url(&ticket.url);
        let response = self
            .authed(self.client.put(&put_url))?
            .body(bytes)
            .send()
            .await?;
        let response = self.check(response).await?;
        let complete: UploadComplete = response
            .json()
            .await
            .map_err(|e| ClientError::Protocol(format!("Failed to parse response: {}", e)))?;

        tracing::debug!(
            "[Client] Uploaded attachment {} -> {}",
            ticket.upload_id,
            complete.storage_id
        );

        Ok(AttachmentRef {
            storage_id: complete.storage_id,
            name,
            kind,
        })
    }
}
