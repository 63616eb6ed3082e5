//! Conversation Handlers
//!
//! Start-chat, conversation listing, and read-marking endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::backend::chat::db;
use crate::backend::error::ChatError;
use crate::backend::middleware::AuthenticatedUser;
use crate::backend::notifications::db as notifications_db;
use crate::backend::server::state::AppState;
use crate::shared::messaging::{
    ListConversationsResponse, StartConversationRequest, StartConversationResponse,
};

/// Start (or resume) a conversation with another user
///
/// Idempotent: calling this twice for the same pair, from either side,
/// returns the same conversation ID.
pub async fn start_conversation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<StartConversationRequest>,
) -> Result<Json<StartConversationResponse>, ChatError> {
    let conversation_id =
        db::get_or_create_conversation(&state.db, user.user_id, request.other_user_id).await?;

    Ok(Json(StartConversationResponse { conversation_id }))
}

/// List the caller's conversations, most recent activity first
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ListConversationsResponse>, ChatError> {
    let conversations = db::list_conversations_for_user(
        &state.db,
        user.user_id,
        state.config.typing_stale_window(),
    )
    .await?;

    Ok(Json(ListConversationsResponse { conversations }))
}

/// Mark a conversation read for the caller, resetting its unread count
pub async fn mark_conversation_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(conversation_id): Path<Uuid>,
) -> Result<StatusCode, ChatError> {
    db::require_participant(&state.db, conversation_id, user.user_id).await?;

    let cleared =
        notifications_db::mark_conversation_read(&state.db, user.user_id, conversation_id).await?;
    tracing::debug!(
        "[Chat] {} marked conversation {} read ({} cleared)",
        user.username,
        conversation_id,
        cleared
    );

    Ok(StatusCode::NO_CONTENT)
}
