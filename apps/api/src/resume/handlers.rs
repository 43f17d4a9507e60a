use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::generation::assistant::MSG_RESUME_MALFORMED;
use crate::models::ResumeDocument;
use crate::resume::assembler::{render_text, ResumeAssembler};
use crate::routes::reply;
use crate::state::AppState;

pub const MSG_RESUME_UPDATED: &str = "Résumé updated successfully!";
pub const MSG_RESUME_PENDING: &str = "A résumé is already being generated";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateResumeRequest {
    pub brief: String,
}

#[derive(Serialize)]
pub struct ResumeView {
    pub document: ResumeDocument,
    /// False while the baseline template is being shown.
    pub generated: bool,
}

impl From<&ResumeAssembler> for ResumeView {
    fn from(assembler: &ResumeAssembler) -> Self {
        ResumeView {
            document: assembler.current(),
            generated: assembler.is_generated(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/resume
pub async fn handle_get_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let shared = state.sessions.from_headers(&headers).await?;
    let session = shared.lock().await;
    Ok(reply(&session.notifications, Ok(ResumeView::from(&session.resume))))
}

/// PUT /api/v1/resume
///
/// Adopts a résumé JSON document after schema validation. A rejected body
/// leaves the held document as it was.
pub async fn handle_adopt_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(candidate): Json<Value>,
) -> Result<Response, AppError> {
    let shared = state.sessions.from_headers(&headers).await?;
    let mut session = shared.lock().await;

    let result = match session.resume.adopt(&candidate) {
        Ok(_) => {
            session.notifications.success(MSG_RESUME_UPDATED);
            Ok(ResumeView::from(&session.resume))
        }
        Err(e) => {
            session.notifications.error(MSG_RESUME_MALFORMED);
            Err(e)
        }
    };
    Ok(reply(&session.notifications, result))
}

/// POST /api/v1/resume/generate
///
/// Runs the AI résumé builder on a free-text brief. The session lock is
/// released while the engine runs; one generation per session at a time.
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<GenerateResumeRequest>,
) -> Result<Response, AppError> {
    let shared = state.sessions.from_headers(&headers).await?;
    let (notifications, in_flight) = {
        let session = shared.lock().await;
        (session.notifications.clone(), session.resume_in_flight.clone())
    };

    let Some(_guard) = in_flight.try_begin() else {
        return Ok(reply::<ResumeView>(
            &notifications,
            Err(AppError::Conflict(MSG_RESUME_PENDING.to_string())),
        ));
    };

    let result = match state
        .assistant
        .generate_resume(&request.brief, &notifications)
        .await
    {
        Ok(document) => {
            let mut session = shared.lock().await;
            session.resume.merge(document);
            info!("Merged generated résumé into session {}", session.id());
            Ok(ResumeView::from(&session.resume))
        }
        Err(e) => Err(e),
    };
    Ok(reply(&notifications, result))
}

/// GET /api/v1/resume/text
///
/// Plain-text download of the current résumé.
pub async fn handle_download_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let shared = state.sessions.from_headers(&headers).await?;
    let text = render_text(&shared.lock().await.resume.current());

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"resume.txt\""),
        ],
        text,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::json;
    use tower::ServiceExt;

    use crate::generation::assistant::{AiContentAssistant, MSG_RESUME_GENERATED};
    use crate::jobs::lifecycle::JobLifecycleManager;
    use crate::routes::build_router;
    use crate::session::{SessionRegistry, SESSION_HEADER};
    use crate::state::AppState;
    use crate::testing::{overloaded, InMemoryJobStore, ScriptedEngine, StaticIdentity};

    use super::*;

    fn app(engine: ScriptedEngine) -> Router {
        build_router(AppState {
            lifecycle: JobLifecycleManager::new(
                Arc::new(InMemoryJobStore::new()),
                Arc::new(StaticIdentity::anonymous()),
            ),
            assistant: AiContentAssistant::new(Arc::new(engine)),
            sessions: SessionRegistry::default(),
        })
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(SESSION_HEADER, "resume-test");
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn resume_json() -> Value {
        json!({
            "personalInfo": {"name": "Grace Hopper", "email": "grace@example.com",
                             "phone": "555-0199", "location": "Arlington, VA",
                             "summary": "Compiler pioneer."},
            "experience": [{"title": "Rear Admiral", "company": "US Navy",
                            "duration": "1943 - 1986", "description": "Led COBOL work."}],
            "education": [{"degree": "PhD Mathematics", "school": "Yale", "year": "1934"}],
            "skills": ["COBOL", "Compilers"]
        })
    }

    #[tokio::test]
    async fn test_fresh_session_shows_default_template() {
        let (status, body) = send_json(
            &app(ScriptedEngine::default()),
            request("GET", "/api/v1/resume", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["generated"], false);
        assert_eq!(body["data"]["document"]["personalInfo"]["name"], "John Doe");
    }

    #[tokio::test]
    async fn test_put_rejects_malformed_and_keeps_template() {
        let app = app(ScriptedEngine::default());
        let mut bad = resume_json();
        bad["skills"] = json!("not a list");

        let (status, body) = send_json(&app, request("PUT", "/api/v1/resume", Some(bad))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["notification"]["text"], MSG_RESUME_MALFORMED);

        let (_, body) = send_json(&app, request("GET", "/api/v1/resume", None)).await;
        assert_eq!(body["data"]["generated"], false);
    }

    #[tokio::test]
    async fn test_put_adopts_valid_document() {
        let app = app(ScriptedEngine::default());
        let (status, body) =
            send_json(&app, request("PUT", "/api/v1/resume", Some(resume_json()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["generated"], true);
        assert_eq!(body["notification"]["text"], MSG_RESUME_UPDATED);
    }

    #[tokio::test]
    async fn test_generate_merges_into_session() {
        let app = app(ScriptedEngine::replying(&resume_json().to_string()));
        let (status, body) = send_json(
            &app,
            request(
                "POST",
                "/api/v1/resume/generate",
                Some(json!({"brief": "Navy officer and compiler author."})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notification"]["text"], MSG_RESUME_GENERATED);

        let (_, body) = send_json(&app, request("GET", "/api/v1/resume", None)).await;
        assert_eq!(body["data"]["generated"], true);
        assert_eq!(body["data"]["document"]["personalInfo"]["name"], "Grace Hopper");
    }

    #[tokio::test]
    async fn test_generate_overloaded_is_service_unavailable() {
        let app = app(ScriptedEngine::failing(overloaded()));
        let (status, body) = send_json(
            &app,
            request("POST", "/api/v1/resume/generate", Some(json!({"brief": "anything"}))),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "GENERATION_UNAVAILABLE");
        assert_eq!(body["notification"]["kind"], "error");
    }

    #[tokio::test]
    async fn test_text_download_is_an_attachment() {
        let response = app(ScriptedEngine::default())
            .oneshot(request("GET", "/api/v1/resume/text", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .starts_with("attachment"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("John Doe"));
    }
}
