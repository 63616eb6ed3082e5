//! Middleware Module
//!
//! Request middleware for the messaging API.

pub mod auth;

pub use auth::{auth_middleware, AuthenticatedUser};
