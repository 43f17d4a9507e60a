//! Single-slot, auto-expiring user-facing message.
//!
//! Posting always supersedes the active message and restarts the expiry
//! timer from scratch. There is no queue and no history.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long a notification stays visible unless superseded or cleared.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct Slot {
    active: Option<Notification>,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every post/clear so a stale timer never clears a newer message.
    generation: u64,
}

impl Slot {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Cloneable handle to one session's notification slot.
#[derive(Clone)]
pub struct NotificationCenter {
    slot: Arc<Mutex<Slot>>,
    ttl: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::with_ttl(NOTIFICATION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the active notification and schedules it to clear after the TTL.
    pub fn post(&self, kind: NotificationKind, text: impl Into<String>) {
        let text = text.into();
        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::zero());

        let mut slot = self.lock();
        slot.cancel_timer();
        slot.generation += 1;
        let generation = slot.generation;

        debug!(?kind, %text, "Posting notification");
        slot.active = Some(Notification {
            kind,
            text,
            expires_at,
        });

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let shared = Arc::clone(&self.slot);
                let ttl = self.ttl;
                slot.timer = Some(runtime.spawn(async move {
                    tokio::time::sleep(ttl).await;
                    let mut slot = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    if slot.generation == generation {
                        slot.active = None;
                        slot.timer = None;
                    }
                }));
            }
            Err(_) => warn!("No async runtime available; notification will not auto-expire"),
        }
    }

    pub fn success(&self, text: impl Into<String>) {
        self.post(NotificationKind::Success, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.post(NotificationKind::Error, text);
    }

    /// Removes the active notification immediately and cancels its timer.
    pub fn clear(&self) {
        let mut slot = self.lock();
        slot.cancel_timer();
        slot.generation += 1;
        slot.active = None;
    }

    pub fn current(&self) -> Option<Notification> {
        self.lock().active.clone()
    }
}
