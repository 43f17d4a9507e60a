//! Per-session state passed explicitly into every core operation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::http::HeaderMap;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::errors::AppError;
use crate::models::{JobRecord, User};
use crate::notify::NotificationCenter;
use crate::resume::assembler::ResumeAssembler;

pub const SESSION_HEADER: &str = "x-session-id";

pub struct Session {
    id: String,
    /// Resolved acting user, cached after the first successful resolution.
    pub user: Option<User>,
    /// Employer listing, newest first. Only replaced wholesale by the lifecycle manager.
    jobs: Vec<JobRecord>,
    pub notifications: NotificationCenter,
    pub resume: ResumeAssembler,
    /// Single-flight marker for description generation on this session's form.
    pub description_in_flight: InFlight,
    /// Single-flight marker for résumé generation.
    pub resume_in_flight: InFlight,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user: None,
            jobs: Vec::new(),
            notifications: NotificationCenter::new(),
            resume: ResumeAssembler::new(),
            description_in_flight: InFlight::default(),
            resume_in_flight: InFlight::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn jobs(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn find_job(&self, id: uuid::Uuid) -> Option<&JobRecord> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub(crate) fn replace_jobs(&mut self, jobs: Vec<JobRecord>) {
        self.jobs = jobs;
    }
}

/// At most one holder at a time. The slot frees itself when the guard drops,
/// including when a request is abandoned mid-flight.
#[derive(Clone, Default)]
pub struct InFlight(Arc<AtomicBool>);

impl InFlight {
    pub fn try_begin(&self) -> Option<InFlightGuard> {
        if self.0.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(InFlightGuard(Arc::clone(&self.0)))
        }
    }
}

pub struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

/// How long a session may sit unused before the registry drops it.
pub const DEFAULT_SESSION_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

/// In-memory map of live sessions keyed by the `x-session-id` header.
/// Sessions idle for longer than `idle_ttl` are dropped.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<String, Entry>>>,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_SESSION_IDLE_TTL)
    }
}

impl SessionRegistry {
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub async fn get_or_create(&self, id: &str) -> SharedSession {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;

        if let Some(entry) = sessions.get_mut(id) {
            if now.duration_since(entry.last_seen) <= self.idle_ttl {
                entry.last_seen = now;
                return Arc::clone(&entry.session);
            }
        }

        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= self.idle_ttl);
        if sessions.len() < before {
            debug!("Evicted {} idle sessions", before - sessions.len());
        }

        let session = Arc::new(Mutex::new(Session::new(id)));
        sessions.insert(
            id.to_string(),
            Entry {
                session: Arc::clone(&session),
                last_seen: now,
            },
        );
        session
    }

    /// Looks up the session named by the request headers.
    pub async fn from_headers(&self, headers: &HeaderMap) -> Result<SharedSession, AppError> {
        let id = headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::Validation(format!("missing '{SESSION_HEADER}' header"))
            })?;
        Ok(self.get_or_create(id).await)
    }
}
