use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Liveness probe; needs no session.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobboard"
    }))
}
