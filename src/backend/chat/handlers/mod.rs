//! Chat HTTP Handlers
//!
//! Axum handlers for the conversation and message endpoints. Each
//! handler resolves the authenticated caller from request extensions
//! and passes the user ID explicitly into the store.

pub mod conversations;
pub mod messages;
pub mod subscription;
pub mod typing;

pub use conversations::{list_conversations, mark_conversation_read, start_conversation};
pub use messages::{delete_message, edit_message, list_messages, send_message};
pub use subscription::subscribe_conversation;
pub use typing::set_typing_status;
