//! Client Module
//!
//! Headless client layer for the messaging core: the HTTP API client,
//! the optimistic outbox and merge logic, the composer state machine,
//! and the typing debouncer. A UI renders `visible_messages()` and
//! forwards input events; everything else lives here.

pub mod api;
pub mod config;
pub mod outbox;
pub mod session;
pub mod state;
pub mod typing;

use thiserror::Error;

pub use api::ChatApiClient;
pub use config::Config;
pub use outbox::{LocalMessage, Outbox, PendingMessage};
pub use session::ChatClient;
pub use state::{ChatSessionState, Draft, StagedAttachment};
pub use typing::{TypingDebouncer, TypingSignal};

/// Errors surfaced by the client layer
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing or rejected credentials
    #[error("Not authenticated")]
    Unauthorized,

    /// The server refused the operation (not a participant / not the
    /// author). Terminal: retrying will not help.
    #[error("Permission denied: {0}")]
    Permission(String),

    /// The referenced entity no longer exists
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport failure. Recoverable: optimistic state is rolled back
    /// and the draft restored so the user can retry.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with something unexpected
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Nothing to send (empty draft, no conversation selected)
    #[error("Invalid draft: {0}")]
    InvalidDraft(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}
