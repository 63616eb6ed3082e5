/**
 * Router Configuration
 *
 * Combines the route groups into the final Axum router.
 *
 * # Route Order
 *
 * 1. Chat routes (conversations, messages, typing, subscriptions)
 * 2. API routes (notifications, storage)
 * 3. Fallback handler (404)
 *
 * Every registered route sits behind the bearer-token middleware; the
 * fallback does not, so unknown paths 404 rather than 401.
 */

use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::backend::middleware::auth::auth_middleware;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::chat_routes::configure_chat_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_chat_routes(Router::new());
    let router = configure_api_routes(router);

    router
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .fallback(|| async { "404 Not Found" })
        .with_state(app_state)
}
