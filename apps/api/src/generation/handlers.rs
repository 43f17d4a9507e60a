//! Axum route handler for AI description generation.

use axum::{extract::State, http::HeaderMap, response::Response, Json};
use tracing::info;

use crate::errors::AppError;
use crate::jobs::form::FormDraft;
use crate::routes::reply;
use crate::state::AppState;

pub const MSG_GENERATION_PENDING: &str = "A description is already being generated";

/// POST /api/v1/jobs/description
///
/// Fills `description` on the posted draft and returns the whole draft.
/// One generation per session at a time; a second request gets 409. The
/// session lock is released while the engine runs.
pub async fn handle_generate_description(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut draft): Json<FormDraft>,
) -> Result<Response, AppError> {
    let shared = state.sessions.from_headers(&headers).await?;
    let (notifications, in_flight) = {
        let session = shared.lock().await;
        (
            session.notifications.clone(),
            session.description_in_flight.clone(),
        )
    };

    let Some(_guard) = in_flight.try_begin() else {
        info!("Description generation already pending; rejecting request");
        return Ok(reply::<FormDraft>(
            &notifications,
            Err(AppError::Conflict(MSG_GENERATION_PENDING.to_string())),
        ));
    };

    let result = state
        .assistant
        .fill_draft(&mut draft, &notifications)
        .await
        .map(|_| draft);
    Ok(reply(&notifications, result))
}
