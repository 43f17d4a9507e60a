use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::form::{self, FormDraft};
use crate::jobs::lifecycle::MSG_STATUS_FAILED;
use crate::models::{JobFilter, JobRecord};
use crate::routes::reply;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    /// The created record; `None` when the draft edited an existing one.
    pub job: Option<JobRecord>,
    pub jobs: Vec<JobRecord>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub id: Uuid,
    pub is_active: bool,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub jobs: Vec<JobRecord>,
}

pub const MSG_JOB_NOT_FOUND: &str = "Job not found";

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Job {id} does not exist"))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/jobs
///
/// Refreshes the session's employer listing from the store.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let shared = state.sessions.from_headers(&headers).await?;
    let mut session = shared.lock().await;

    let result = state
        .lifecycle
        .list(&mut session)
        .await
        .map(|_| session.jobs().to_vec());
    Ok(reply(&session.notifications, result))
}

/// GET /api/v1/jobs/browse?search=
///
/// Seeker view: active listings only. Leaves the employer listing alone.
pub async fn handle_browse_jobs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<JobFilter>,
) -> Result<Response, AppError> {
    let shared = state.sessions.from_headers(&headers).await?;
    let session = shared.lock().await;

    let result = state.lifecycle.browse(&session, filter).await;
    Ok(reply(&session.notifications, result))
}

/// POST /api/v1/jobs
///
/// Submits the job form: updates when `editing` is set, creates otherwise.
pub async fn handle_submit_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<FormDraft>,
) -> Result<Response, AppError> {
    let shared = state.sessions.from_headers(&headers).await?;
    let mut session = shared.lock().await;

    let result = state
        .lifecycle
        .submit(&mut session, &draft)
        .await
        .map(|job| SubmitResponse {
            job,
            jobs: session.jobs().to_vec(),
        });
    Ok(reply(&session.notifications, result))
}

/// GET /api/v1/jobs/:id/draft
///
/// Edit-mode form for an existing record.
pub async fn handle_get_draft(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let shared = state.sessions.from_headers(&headers).await?;
    let mut session = shared.lock().await;

    let result = match state.lifecycle.locate(&mut session, id).await {
        Ok(Some(job)) => Ok(form::from_record(&job)),
        Ok(None) => {
            session.notifications.error(MSG_JOB_NOT_FOUND);
            Err(not_found(id))
        }
        Err(e) => Err(e),
    };
    Ok(reply(&session.notifications, result))
}

/// PATCH /api/v1/jobs/:id/status
pub async fn handle_toggle_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let shared = state.sessions.from_headers(&headers).await?;
    let mut session = shared.lock().await;

    let result = match state.lifecycle.locate(&mut session, id).await {
        Ok(Some(job)) => state
            .lifecycle
            .toggle_active(&mut session, &job)
            .await
            .map(|is_active| StatusResponse { id, is_active }),
        Ok(None) => {
            session.notifications.error(MSG_STATUS_FAILED);
            Err(not_found(id))
        }
        Err(e) => Err(e),
    };
    Ok(reply(&session.notifications, result))
}

/// DELETE /api/v1/jobs/:id?confirm=true
///
/// Without `confirm=true` this is a no-op that reports `deleted: false`.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
) -> Result<Response, AppError> {
    let shared = state.sessions.from_headers(&headers).await?;
    let mut session = shared.lock().await;

    let result = state
        .lifecycle
        .delete(&mut session, id, query.confirm)
        .await
        .map(|deleted| DeleteResponse {
            deleted,
            jobs: session.jobs().to_vec(),
        });
    Ok(reply(&session.notifications, result))
}
