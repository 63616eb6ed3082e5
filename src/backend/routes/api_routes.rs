//! API Routes
//!
//! Notification and storage endpoints.
//!
//! - `GET /api/notifications` - list the caller's notifications
//! - `POST /api/notifications/{id}/read` - mark one notification read
//! - `POST /api/storage/upload-url` - phase one of an upload
//! - `PUT /api/storage/{upload_id}` - phase two: the bytes
//! - `GET /api/storage/{storage_id}` - fetch stored bytes

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::backend::error::ChatError;
use crate::backend::middleware::AuthenticatedUser;
use crate::backend::notifications::db as notifications_db;
use crate::backend::server::state::AppState;
use crate::backend::storage::blob::UploadComplete;
use crate::backend::storage::UploadTicket;
use crate::shared::messaging::ListNotificationsResponse;

/// List the caller's notifications, newest first
async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ListNotificationsResponse>, ChatError> {
    let notifications =
        notifications_db::list_notifications_for_user(&state.db, user.user_id).await?;
    let unread_total = notifications_db::unread_total(&state.db, user.user_id).await?;

    Ok(Json(ListNotificationsResponse {
        notifications,
        unread_total,
    }))
}

/// Mark a single notification read
async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(notification_id): Path<Uuid>,
) -> Result<StatusCode, ChatError> {
    notifications_db::mark_read(&state.db, notification_id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Phase one of an attachment upload: issue a write-once ticket
async fn create_upload_url(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthenticatedUser>,
) -> Result<Json<UploadTicket>, ChatError> {
    Ok(Json(state.blob_store.create_upload()))
}

/// Phase two: receive the bytes, return the opaque storage ID
async fn complete_upload(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthenticatedUser>,
    Path(upload_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<UploadComplete>, ChatError> {
    let storage_id = state
        .blob_store
        .complete_upload(upload_id, body)
        .ok_or_else(|| ChatError::not_found("upload ticket"))?;

    Ok(Json(UploadComplete { storage_id }))
}

/// Serve stored bytes (the resolved side of an attachment URL)
async fn fetch_blob(
    State(state): State<AppState>,
    Path(storage_id): Path<String>,
) -> Result<Bytes, ChatError> {
    state
        .blob_store
        .get(&storage_id)
        .ok_or_else(|| ChatError::not_found("blob"))
}

/// Add notification and storage routes to the router
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/notifications", get(list_notifications))
        .route(
            "/api/notifications/{notification_id}/read",
            post(mark_notification_read),
        )
        .route("/api/storage/upload-url", post(create_upload_url))
        .route(
            "/api/storage/{id}",
            put(complete_upload).get(fetch_blob),
        )
}
