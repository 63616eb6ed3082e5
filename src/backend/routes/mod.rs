//! Routes Module
//!
//! Route configuration for the messaging server, split by surface:
//! chat endpoints, and the notification/storage API.

pub mod api_routes;
pub mod chat_routes;
pub mod router;

pub use router::create_router;
