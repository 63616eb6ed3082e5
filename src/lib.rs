//! Gamefolio Messaging Core
//!
//! Gamefolio is a social/portfolio platform connecting game studios,
//! independent creators, and players. This crate is the platform's
//! messaging core: conversations, message delivery, typing presence,
//! read/unread tracking, and the client-side optimistic sync layer.
//!
//! # Module Structure
//!
//! The library is organized into three main modules:
//!
//! - **`shared`** - Types shared between client and backend
//!   - Conversation/message/notification views, realtime events
//!   - Request/response DTOs, error types
//!
//! - **`backend`** - Server-side code
//!   - Axum HTTP server with streaming chat subscriptions
//!   - Conversation and message stores over sqlx/SQLite
//!   - Notification dispatch, typing presence, blob storage boundary
//!
//! - **`client`** - Headless client sync layer
//!   - HTTP API client (reqwest)
//!   - Optimistic outbox with pending/committed reconciliation
//!   - Typing debounce
//!
//! Presentation (pages, widgets, layout) is intentionally absent: the
//! client module ends at the merged message view a UI would render.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;

/// Headless client sync layer
pub mod client;
