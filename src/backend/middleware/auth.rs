/**
 * Authentication Middleware
 *
 * Protects routes that require an authenticated caller. Extracts the
 * bearer token from the Authorization header, verifies it against the
 * identity provider's signing key, confirms the user record exists, and
 * attaches the resolved `AuthenticatedUser` to request extensions.
 *
 * Handlers receive the caller explicitly (`Extension<AuthenticatedUser>`)
 * and thread the user ID into every store call — authorization below
 * this layer never consults ambient state.
 */

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::identity::sessions::verify_token;
use crate::backend::identity::users;
use crate::backend::server::state::AppState;

/// Authenticated caller resolved from the bearer token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
}

/// Authentication middleware
///
/// Returns 401 Unauthorized if the token is missing, invalid, or names
/// a user the identity provider no longer knows.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("[Auth] Missing Authorization header");
            StatusCode::UNAUTHORIZED
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!("[Auth] Invalid Authorization header format");
        StatusCode::UNAUTHORIZED
    })?;

    let claims = verify_token(token).map_err(|e| {
        tracing::warn!("[Auth] Invalid token: {:?}", e);
        StatusCode::UNAUTHORIZED
    })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|e| {
        tracing::error!("[Auth] Invalid user ID in token: {:?}", e);
        StatusCode::UNAUTHORIZED
    })?;

    let user = users::get_user_by_id(&app_state.db, user_id)
        .await
        .map_err(|e| {
            tracing::error!("[Auth] User lookup failed: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or_else(|| {
            tracing::warn!("[Auth] Token names unknown user {}", user_id);
            StatusCode::UNAUTHORIZED
        })?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        username: user.username,
    });

    Ok(next.run(request).await)
}
