/**
 * Conversation Subscription Handler
 *
 * Streaming subscription for GET /api/chat/conversations/{id}/subscribe.
 *
 * # Stream Format
 *
 * The response is a newline-delimited JSON stream
 * (`application/x-ndjson`): the first frame is a snapshot of the
 * conversation's messages at subscribe time, every following frame is a
 * live `ChatEvent`. Blank lines are keep-alive heartbeats and can be
 * ignored.
 *
 * ```text
 * {"frame":"snapshot","messages":[...]}
 * {"frame":"event","event":{"type":"message_sent",...}}
 *
 * {"frame":"event","event":{"type":"typing",...}}
 * ```
 *
 * # Lifecycle
 *
 * Snapshot → live events → teardown. The forwarding task ends as soon
 * as a send into the response stream fails (the client dropped the
 * connection), which drops its broadcast receiver and releases the
 * conversation channel slot.
 */

use std::io;

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
    Extension,
};
use bytes::Bytes;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use crate::backend::chat::db;
use crate::backend::error::ChatError;
use crate::backend::middleware::AuthenticatedUser;
use crate::backend::server::state::AppState;
use crate::shared::event::SubscriptionFrame;

/// Keep-alive period for idle subscriptions
const HEARTBEAT_SECS: u64 = 30;

/// Serialize a frame as one newline-terminated JSON line
fn frame_bytes(frame: &SubscriptionFrame) -> Result<Bytes, ChatError> {
    let mut line = serde_json::to_vec(frame)?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}

/// Handle a conversation subscription request
pub async fn subscribe_conversation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Response, ChatError> {
    db::require_participant(&state.db, conversation_id, user.user_id).await?;

    // Snapshot before subscribing would lose events landing in between;
    // subscribe first, then snapshot, so every later event is newer
    // than (or duplicated in) the snapshot.
    let mut events = state.chat_broadcast.subscribe(conversation_id);
    let snapshot = db::list_messages(&state.db, &state.blob_store, conversation_id, user.user_id)
        .await?;

    tracing::info!(
        "[Realtime] {} subscribed to conversation {} ({} messages in snapshot)",
        user.username,
        conversation_id,
        snapshot.len()
    );

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Result<Bytes, io::Error>>();

    tokio::spawn(async move {
        let initial = match frame_bytes(&SubscriptionFrame::Snapshot { messages: snapshot }) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("[Realtime] Failed to encode snapshot: {:?}", e);
                return;
            }
        };
        if tx.send(Ok(initial)).is_err() {
            return;
        }

        let mut heartbeat =
            tokio::time::interval(tokio::time::Duration::from_secs(HEARTBEAT_SECS));
        heartbeat.tick().await; // first tick completes immediately

        loop {
            tokio::select! {
                received = events.recv() => match received {
                    Ok(event) => {
                        let frame = SubscriptionFrame::Event { event };
                        match frame_bytes(&frame) {
                            Ok(bytes) => {
                                if tx.send(Ok(bytes)).is_err() {
                                    // Client dropped the stream
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::error!("[Realtime] Failed to encode event: {:?}", e);
                            }
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "[Realtime] Subscriber lagged, skipped {} events; client should resubscribe for a fresh snapshot",
                            skipped
                        );
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        break;
                    }
                },
                _ = heartbeat.tick() => {
                    if tx.send(Ok(Bytes::from_static(b"\n"))).is_err() {
                        break;
                    }
                }
            }
        }

        tracing::debug!("[Realtime] Subscription stream for {} closed", conversation_id);
    });

    let body = Body::from_stream(UnboundedReceiverStream::new(rx));

    Response::builder()
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache, no-transform, no-store")
        // Prevent proxies from buffering the stream
        .header("X-Accel-Buffering", "no")
        .body(body)
        .map_err(|e| {
            tracing::error!("[Realtime] Failed to build response: {:?}", e);
            ChatError::Shared(crate::shared::SharedError::serialization(e.to_string()))
        })
}
