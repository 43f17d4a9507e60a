use crate::generation::assistant::AiContentAssistant;
use crate::jobs::lifecycle::JobLifecycleManager;
use crate::session::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: JobLifecycleManager,
    pub assistant: AiContentAssistant,
    /// Live sessions keyed by the `x-session-id` header.
    pub sessions: SessionRegistry,
}
