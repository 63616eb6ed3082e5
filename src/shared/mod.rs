//! Shared Module
//!
//! Types and data structures shared between the client and the backend.
//! Everything here is designed for serialization and transmission over
//! HTTP; nothing depends on the server's storage layer or the client's
//! runtime.

/// Real-time event system
pub mod event;

/// Shared error types
pub mod error;

/// Messaging types: conversations, messages, notifications, profiles
pub mod messaging;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use event::ChatEvent;
