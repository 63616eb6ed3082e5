//! Typing Indicator Handler
//!
//! Receives keystroke-driven typing signals, records them in the
//! conversation's presence map, and broadcasts the edge to subscribers.
//! Idempotent in both directions: repeated `true` refreshes the single
//! presence row, repeated `false` stays cleared.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::backend::chat::typing;
use crate::backend::error::ChatError;
use crate::backend::middleware::AuthenticatedUser;
use crate::backend::server::state::AppState;
use crate::shared::event::ChatEvent;
use crate::shared::messaging::TypingRequest;

/// Handle a typing signal (POST /api/chat/conversations/{id}/typing)
pub async fn set_typing_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(conversation_id): Path<Uuid>,
    Json(request): Json<TypingRequest>,
) -> Result<StatusCode, ChatError> {
    typing::set_typing(&state.db, conversation_id, user.user_id, request.is_typing).await?;

    state.chat_broadcast.publish(ChatEvent::typing(
        conversation_id,
        user.user_id,
        request.is_typing,
    ));

    Ok(StatusCode::NO_CONTENT)
}
