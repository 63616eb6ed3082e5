//! Message Handlers
//!
//! Send, list, edit, and delete endpoints. Send orchestrates the
//! store write, the notification fan-out to every other participant,
//! and the realtime broadcast — in that order, so nothing is announced
//! before it is durable.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::backend::chat::db;
use crate::backend::error::ChatError;
use crate::backend::middleware::AuthenticatedUser;
use crate::backend::notifications::NotificationInput;
use crate::backend::server::state::AppState;
use crate::shared::event::ChatEvent;
use crate::shared::messaging::{
    EditMessageRequest, ListMessagesResponse, NotificationKind, SendMessageRequest,
    SendMessageResponse,
};

/// List a conversation's messages in ascending order
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<ListMessagesResponse>, ChatError> {
    let messages =
        db::list_messages(&state.db, &state.blob_store, conversation_id, user.user_id).await?;

    Ok(Json(ListMessagesResponse { messages }))
}

/// Send a message to a conversation
pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(conversation_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ChatError> {
    let message = db::send_message(
        &state.db,
        &state.blob_store,
        conversation_id,
        user.user_id,
        &request,
    )
    .await?;

    // One notification per other participant, tagged with the
    // conversation so unread counts can be computed per conversation
    for participant in db::participants(&state.db, conversation_id).await? {
        if participant == user.user_id {
            continue;
        }
        state
            .dispatcher
            .dispatch(
                &state.db,
                NotificationInput {
                    recipient_id: participant,
                    sender_id: Some(user.user_id),
                    kind: NotificationKind::Message,
                    related_id: Some(conversation_id),
                },
            )
            .await?;
    }

    let message_id = message.id;
    state.chat_broadcast.publish(ChatEvent::MessageSent {
        conversation_id,
        message,
    });

    Ok(Json(SendMessageResponse { message_id }))
}

/// Edit a message body (author only)
pub async fn edit_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(message_id): Path<Uuid>,
    Json(request): Json<EditMessageRequest>,
) -> Result<StatusCode, ChatError> {
    let (conversation_id, edited_at) =
        db::edit_message(&state.db, message_id, user.user_id, &request.body).await?;

    state.chat_broadcast.publish(ChatEvent::MessageEdited {
        conversation_id,
        message_id,
        body: request.body.trim().to_string(),
        edited_at,
    });

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a message (author only; deleting a missing message succeeds)
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(message_id): Path<Uuid>,
) -> Result<StatusCode, ChatError> {
    if let Some(conversation_id) =
        db::delete_message(&state.db, message_id, user.user_id).await?
    {
        state.chat_broadcast.publish(ChatEvent::MessageDeleted {
            conversation_id,
            message_id,
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
