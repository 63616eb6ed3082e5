//! Chat Routes
//!
//! Routes for conversations, messages, typing, and subscriptions.
//!
//! - `POST /api/chat/conversations` - start (or resume) a conversation
//! - `GET /api/chat/conversations` - list the caller's conversations
//! - `POST /api/chat/conversations/{id}/read` - reset unread count
//! - `POST /api/chat/conversations/{id}/typing` - typing signal
//! - `GET /api/chat/conversations/{id}/messages` - list messages
//! - `POST /api/chat/conversations/{id}/messages` - send a message
//! - `GET /api/chat/conversations/{id}/subscribe` - event stream
//! - `PATCH /api/chat/messages/{id}` - edit a message
//! - `DELETE /api/chat/messages/{id}` - delete a message

use axum::routing::{get, patch, post};
use axum::Router;

use crate::backend::chat::handlers;
use crate::backend::server::state::AppState;

/// Add chat routes to the router
pub fn configure_chat_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/chat/conversations",
            post(handlers::start_conversation).get(handlers::list_conversations),
        )
        .route(
            "/api/chat/conversations/{conversation_id}/read",
            post(handlers::mark_conversation_read),
        )
        .route(
            "/api/chat/conversations/{conversation_id}/typing",
            post(handlers::set_typing_status),
        )
        .route(
            "/api/chat/conversations/{conversation_id}/messages",
            get(handlers::list_messages).post(handlers::send_message),
        )
        .route(
            "/api/chat/conversations/{conversation_id}/subscribe",
            get(handlers::subscribe_conversation),
        )
        .route(
            "/api/chat/messages/{message_id}",
            patch(handlers::edit_message).delete(handlers::delete_message),
        )
}
