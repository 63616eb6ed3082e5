/**
 * Server Initialization
 *
 * Builds the Axum application: loads configuration, connects and
 * initializes the database, assembles state, and configures routes.
 *
 * # Initialization Steps
 *
 * 1. Load `ServerConfig` from the environment
 * 2. Connect the database pool (schema applied at connect time)
 * 3. Create broadcast channels, blob store, and the notification
 *    dispatcher
 * 4. Create the router
 */

use axum::Router;

use crate::backend::routes::create_router;
use crate::backend::server::config::{connect_database, ServerConfig};
use crate::backend::server::state::AppState;

/// Create the Axum application from environment configuration
pub async fn create_app() -> Result<Router<()>, sqlx::Error> {
    let config = ServerConfig::from_env();
    tracing::info!(
        "Initializing Gamefolio messaging server (db: {})",
        config.database_url
    );

    let pool = connect_database(&config.database_url).await?;
    tracing::info!("Database connected and schema initialized");

    Ok(build_app(AppState::new(pool, config)))
}

/// Build the application from already-assembled state.
///
/// The test harness uses this directly with an in-memory pool and
/// seeded users.
pub fn build_app(state: AppState) -> Router<()> {
    create_router(state)
}
