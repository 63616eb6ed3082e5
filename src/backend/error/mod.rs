//! Backend Error Module
//!
//! Error types used by the store operations and HTTP handlers, plus the
//! conversion into HTTP responses.

pub mod conversion;
pub mod types;

pub use types::ChatError;
