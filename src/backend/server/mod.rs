//! Server Module
//!
//! Configuration, application state, and server initialization.

pub mod config;
pub mod init;
pub mod state;

pub use config::{connect_database, ServerConfig};
pub use state::AppState;
