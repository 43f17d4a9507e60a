use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::notify::Notification;
use crate::state::AppState;

#[derive(Serialize)]
pub struct NotificationResponse {
    pub notification: Option<Notification>,
}

/// GET /api/v1/notification
pub async fn handle_get_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<NotificationResponse>, AppError> {
    let session = state.sessions.from_headers(&headers).await?;
    let notification = session.lock().await.notifications.current();
    Ok(Json(NotificationResponse { notification }))
}

/// DELETE /api/v1/notification
///
/// Dismisses the active message before its timer fires.
pub async fn handle_clear_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<NotificationResponse>, AppError> {
    let session = state.sessions.from_headers(&headers).await?;
    session.lock().await.notifications.clear();
    Ok(Json(NotificationResponse { notification: None }))
}
