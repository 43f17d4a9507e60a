//! Job lifecycle: orchestrates listing CRUD against the store.
//!
//! Flow for every mutation: resolve identity (create/update only) → store call →
//! refresh the session listing → post a notification.
//!
//! The session listing is only ever replaced wholesale with what the store
//! returned. Nothing is patched locally before the store confirms. Concurrent
//! edits to one record are last-write-wins; there is no version check.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::form::{self, FormDraft};
use crate::jobs::identity::IdentityProvider;
use crate::jobs::store::JobRecordStore;
use crate::models::{JobFilter, JobPatch, JobRecord, User};
use crate::session::Session;

pub const MSG_LOAD_FAILED: &str = "Failed to load jobs";
pub const MSG_SIGN_IN_REQUIRED: &str = "Please sign in to post jobs";
pub const MSG_POSTED: &str = "Job posted successfully!";
pub const MSG_UPDATED: &str = "Job updated successfully!";
pub const MSG_SAVE_FAILED: &str = "Failed to save job. Please try again.";
pub const MSG_DELETED: &str = "Job deleted successfully!";
pub const MSG_DELETE_FAILED: &str = "Failed to delete job";
pub const MSG_STATUS_FAILED: &str = "Failed to update job status";

#[derive(Clone)]
pub struct JobLifecycleManager {
    store: Arc<dyn JobRecordStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl JobLifecycleManager {
    pub fn new(store: Arc<dyn JobRecordStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Refreshes the session listing. On failure the previous listing is kept.
    pub async fn list(&self, session: &mut Session) -> Result<(), AppError> {
        match self.store.list(&JobFilter::default()).await {
            Ok(jobs) => {
                info!("Loaded {} jobs for session {}", jobs.len(), session.id());
                session.replace_jobs(jobs);
                Ok(())
            }
            Err(e) => {
                error!("Error fetching jobs: {e}");
                session.notifications.error(MSG_LOAD_FAILED);
                Err(e.into())
            }
        }
    }

    /// Finds `id` in the session listing, refreshing it once from the store
    /// when the record is not cached yet. A failed refresh is returned as is.
    pub async fn locate(
        &self,
        session: &mut Session,
        id: Uuid,
    ) -> Result<Option<JobRecord>, AppError> {
        if let Some(job) = session.find_job(id) {
            return Ok(Some(job.clone()));
        }
        debug!("Job {id} not cached for session {}; refreshing", session.id());
        self.list(session).await?;
        Ok(session.find_job(id).cloned())
    }

    /// Seeker view: active listings matching `filter`. Does not touch the session listing.
    pub async fn browse(
        &self,
        session: &Session,
        mut filter: JobFilter,
    ) -> Result<Vec<JobRecord>, AppError> {
        filter.active_only = true;
        self.store.list(&filter).await.map_err(|e| {
            error!("Error browsing jobs: {e}");
            session.notifications.error(MSG_LOAD_FAILED);
            e.into()
        })
    }

    /// Creates a listing from `draft`, stamped with the acting user.
    pub async fn create(
        &self,
        session: &mut Session,
        draft: &FormDraft,
    ) -> Result<JobRecord, AppError> {
        let user = self.resolve_identity(session).await?;
        let fields = form::to_record(draft, user.id);

        let record = match self.store.insert(fields).await {
            Ok(record) => record,
            Err(e) => {
                error!("Error saving job: {e}");
                session.notifications.error(MSG_SAVE_FAILED);
                return Err(e.into());
            }
        };

        info!("Created job {} ({})", record.id, record.title);
        session.notifications.success(MSG_POSTED);
        // A failed refresh supersedes the success message; the insert itself stands.
        let _ = self.list(session).await;
        Ok(record)
    }

    /// Replaces every editable field of `id` with the draft's values.
    pub async fn update(
        &self,
        session: &mut Session,
        id: Uuid,
        draft: &FormDraft,
    ) -> Result<(), AppError> {
        let user = self.resolve_identity(session).await?;
        let fields = form::to_record(draft, user.id);

        if let Err(e) = self.store.update(id, JobPatch::Fields(fields)).await {
            error!("Error saving job {id}: {e}");
            session.notifications.error(MSG_SAVE_FAILED);
            return Err(e.into());
        }

        info!("Updated job {id}");
        session.notifications.success(MSG_UPDATED);
        let _ = self.list(session).await;
        Ok(())
    }

    /// Submit-job-form: updates when the draft carries an editing target, creates otherwise.
    pub async fn submit(
        &self,
        session: &mut Session,
        draft: &FormDraft,
    ) -> Result<Option<JobRecord>, AppError> {
        match draft.editing {
            Some(id) => self.update(session, id, draft).await.map(|_| None),
            None => self.create(session, draft).await.map(Some),
        }
    }

    /// Flips `is_active` on `job`. Returns the new value.
    pub async fn toggle_active(
        &self,
        session: &mut Session,
        job: &JobRecord,
    ) -> Result<bool, AppError> {
        let is_active = !job.is_active;

        if let Err(e) = self.store.update(job.id, JobPatch::Active(is_active)).await {
            error!("Error updating job status for {}: {e}", job.id);
            session.notifications.error(MSG_STATUS_FAILED);
            return Err(e.into());
        }

        info!("Job {} is_active={}", job.id, is_active);
        let verb = if is_active { "activated" } else { "deactivated" };
        session
            .notifications
            .success(format!("Job {verb} successfully!"));
        let _ = self.list(session).await;
        Ok(is_active)
    }

    /// Deletes `id` once the caller has confirmed. Returns whether a delete was issued.
    pub async fn delete(
        &self,
        session: &mut Session,
        id: Uuid,
        confirmed: bool,
    ) -> Result<bool, AppError> {
        if !confirmed {
            info!("Delete of job {id} not confirmed; skipping");
            return Ok(false);
        }

        if let Err(e) = self.store.delete(id).await {
            error!("Error deleting job {id}: {e}");
            session.notifications.error(MSG_DELETE_FAILED);
            return Err(e.into());
        }

        info!("Deleted job {id}");
        session.notifications.success(MSG_DELETED);
        let _ = self.list(session).await;
        Ok(true)
    }

    /// Session cache → provider's current user → anonymous sign-in.
    async fn resolve_identity(&self, session: &mut Session) -> Result<User, AppError> {
        if let Some(user) = &session.user {
            return Ok(user.clone());
        }

        let resolved = match self.identity.current_user(session.id()).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => self.identity.sign_in_anonymously(session.id()).await,
            Err(e) => Err(e),
        };

        match resolved {
            Ok(user) => {
                session.user = Some(user.clone());
                Ok(user)
            }
            Err(e) => {
                warn!("Error signing in: {e}");
                session.notifications.error(MSG_SIGN_IN_REQUIRED);
                Err(AppError::Validation(MSG_SIGN_IN_REQUIRED.to_string()))
            }
        }
    }
}
