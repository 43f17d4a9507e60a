pub mod health;
pub mod notification;

use axum::{
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::generation::handlers as generation;
use crate::jobs::handlers as jobs;
use crate::notify::{Notification, NotificationCenter};
use crate::resume::handlers as resume;
use crate::state::AppState;

#[derive(Serialize)]
struct Envelope<T> {
    data: T,
    notification: Option<Notification>,
}

/// Wraps an operation outcome together with the session's active notification.
///
/// Success: `{data, notification}`. Failure: `{error: {code, message}, notification}`.
pub fn reply<T: Serialize>(notifications: &NotificationCenter, result: Result<T, AppError>) -> Response {
    let notification = notifications.current();
    match result {
        Ok(data) => Json(Envelope { data, notification }).into_response(),
        Err(err) => {
            let (status, mut body) = err.into_parts();
            if let Value::Object(map) = &mut body {
                map.insert(
                    "notification".to_string(),
                    serde_json::to_value(notification).unwrap_or(Value::Null),
                );
            }
            (status, Json(body)).into_response()
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Employer listing
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_submit_job),
        )
        .route("/api/v1/jobs/browse", get(jobs::handle_browse_jobs))
        .route("/api/v1/jobs/description", post(generation::handle_generate_description))
        .route("/api/v1/jobs/:id", axum::routing::delete(jobs::handle_delete_job))
        .route("/api/v1/jobs/:id/draft", get(jobs::handle_get_draft))
        .route("/api/v1/jobs/:id/status", patch(jobs::handle_toggle_status))
        // Notification slot
        .route(
            "/api/v1/notification",
            get(notification::handle_get_notification).delete(notification::handle_clear_notification),
        )
        // Résumé builder
        .route(
            "/api/v1/resume",
            get(resume::handle_get_resume).put(resume::handle_adopt_resume),
        )
        .route("/api/v1/resume/generate", post(resume::handle_generate_resume))
        .route("/api/v1/resume/text", get(resume::handle_download_resume))
        .with_state(state)
}
