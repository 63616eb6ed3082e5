//! Real-time Module
//!
//! Per-conversation broadcast channels. Committed mutations publish
//! `ChatEvent`s here; subscription handlers stream them to clients.

pub mod broadcast;

pub use broadcast::ChatBroadcast;
