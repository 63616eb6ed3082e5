/**
 * Application State Management
 *
 * Central state container for the Axum application, with `FromRef`
 * implementations so handlers can extract just the piece they need.
 *
 * # Thread Safety
 *
 * Every field is cheaply cloneable and safe to share:
 * - `SqlitePool` is a handle to the pooled connection
 * - `ChatBroadcast` and `BlobStore` hold `Arc`s internally
 * - `NotificationDispatcher` shares its debounce map behind a mutex
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::notifications::{LogNotifier, NotificationDispatcher};
use crate::backend::realtime::ChatBroadcast;
use crate::backend::server::config::ServerConfig;
use crate::backend::storage::BlobStore;

/// Application state for the messaging server
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Server configuration (staleness windows, debounce, ...)
    pub config: Arc<ServerConfig>,
    /// Per-conversation realtime broadcast channels
    pub chat_broadcast: ChatBroadcast,
    /// Blob store boundary
    pub blob_store: BlobStore,
    /// Notification trigger contract
    pub dispatcher: NotificationDispatcher,
}

impl AppState {
    /// Assemble state with the default (logging) notifier
    pub fn new(db: SqlitePool, config: ServerConfig) -> Self {
        let dispatcher = NotificationDispatcher::new(
            Arc::new(LogNotifier),
            config.email_debounce_window(),
        );
        Self {
            db,
            config: Arc::new(config),
            chat_broadcast: ChatBroadcast::new(),
            blob_store: BlobStore::new(),
            dispatcher,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db.clone()
    }
}

impl FromRef<AppState> for ChatBroadcast {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.chat_broadcast.clone()
    }
}

impl FromRef<AppState> for BlobStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.blob_store.clone()
    }
}

impl FromRef<AppState> for NotificationDispatcher {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.dispatcher.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
