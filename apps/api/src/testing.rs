//! In-memory collaborators for unit and router tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::jobs::identity::{IdentityError, IdentityProvider};
use crate::jobs::store::{JobRecordStore, StoreError};
use crate::llm_client::{GenerationEngine, LlmError};
use crate::models::{JobFields, JobFilter, JobPatch, JobRecord, User};

/// Substring, case-insensitive: the same predicate the Postgres store applies.
pub fn matches_filter(filter: &JobFilter, job: &JobRecord) -> bool {
    if filter.active_only && !job.is_active {
        return false;
    }
    let Some(term) = filter.search_term() else {
        return true;
    };
    let term = term.to_lowercase();
    [&job.title, &job.company, &job.location]
        .into_iter()
        .chain(job.tags.iter())
        .any(|field| field.to_lowercase().contains(&term))
}

/// Store double. Records are kept in insertion order; `list` sorts newest first.
#[derive(Default)]
pub struct InMemoryJobStore {
    records: Mutex<Vec<JobRecord>>,
    pub fail: AtomicBool,
    /// Fails only `list`, leaving writes working.
    pub fail_list: AtomicBool,
    pub list_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn set_list_failing(&self, failing: bool) {
        self.fail_list.store(failing, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<JobRecord> {
        self.records.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl JobRecordStore for InMemoryJobStore {
    async fn list(&self, filter: &JobFilter) -> Result<Vec<JobRecord>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated list outage".to_string()));
        }
        let mut jobs: Vec<JobRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|job| matches_filter(filter, job))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn insert(&self, fields: JobFields) -> Result<JobRecord, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let now = Utc::now();
        let record = JobRecord {
            id: Uuid::new_v4(),
            title: fields.title,
            company: fields.company,
            location: fields.location,
            job_type: fields.job_type,
            salary: fields.salary,
            description: fields.description,
            requirements: fields.requirements,
            tags: fields.tags,
            posted_by: fields.posted_by,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: JobPatch) -> Result<(), StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|job| job.id == id)
            .ok_or(StoreError::NotFound(id))?;
        match patch {
            JobPatch::Fields(fields) => {
                record.title = fields.title;
                record.company = fields.company;
                record.location = fields.location;
                record.job_type = fields.job_type;
                record.salary = fields.salary;
                record.description = fields.description;
                record.requirements = fields.requirements;
                record.tags = fields.tags;
                record.posted_by = fields.posted_by;
            }
            JobPatch::Active(is_active) => record.is_active = is_active,
        }
        record.updated_at = Utc::now().max(record.created_at);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.records.lock().unwrap().retain(|job| job.id != id);
        Ok(())
    }
}

/// Identity double with a configurable current user and sign-in outcome.
pub struct StaticIdentity {
    current: Mutex<Option<User>>,
    pub reject_sign_in: AtomicBool,
    pub sign_in_calls: AtomicUsize,
}

impl StaticIdentity {
    pub fn anonymous() -> Self {
        Self {
            current: Mutex::new(None),
            reject_sign_in: AtomicBool::new(false),
            sign_in_calls: AtomicUsize::new(0),
        }
    }

    pub fn signed_in(user: User) -> Self {
        let identity = Self::anonymous();
        *identity.current.lock().unwrap() = Some(user);
        identity
    }

    pub fn rejecting() -> Self {
        let identity = Self::anonymous();
        identity.reject_sign_in.store(true, Ordering::SeqCst);
        identity
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user(&self, _session_id: &str) -> Result<Option<User>, IdentityError> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn sign_in_anonymously(&self, _session_id: &str) -> Result<User, IdentityError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_sign_in.load(Ordering::SeqCst) {
            return Err(IdentityError::Rejected("anonymous sign-in disabled".to_string()));
        }
        let user = test_user();
        *self.current.lock().unwrap() = Some(user.clone());
        Ok(user)
    }
}

pub fn test_user() -> User {
    User {
        id: Uuid::new_v4(),
        is_anonymous: true,
        created_at: Utc::now(),
    }
}

/// Engine double that replays queued outcomes and counts invocations.
#[derive(Default)]
pub struct ScriptedEngine {
    outcomes: Mutex<VecDeque<Result<String, LlmError>>>,
    pub prompts: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
    /// When set, each call waits for a notification before answering.
    pub gate: Option<Arc<Notify>>,
}

impl ScriptedEngine {
    pub fn replying(text: &str) -> Self {
        let engine = Self::default();
        engine.push(Ok(text.to_string()));
        engine
    }

    pub fn failing(error: LlmError) -> Self {
        let engine = Self::default();
        engine.push(Err(error));
        engine
    }

    /// Every call blocks until `gate` is notified.
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn push(&self, outcome: Result<String, LlmError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationEngine for ScriptedEngine {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}

pub fn overloaded() -> LlmError {
    LlmError::Api {
        status: 503,
        message: "The model is overloaded. Please try again later.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobType;

    fn record() -> JobRecord {
        let now = Utc::now();
        JobRecord {
            id: Uuid::new_v4(),
            title: "Senior Frontend Developer".to_string(),
            company: "TechCorp".to_string(),
            location: "San Francisco, CA".to_string(),
            job_type: JobType::FullTime,
            salary: "$120k - $160k".to_string(),
            description: String::new(),
            requirements: vec!["React".to_string()],
            tags: vec!["Remote".to_string(), "100% Tech".to_string()],
            posted_by: Uuid::new_v4(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn search(term: &str) -> JobFilter {
        JobFilter {
            active_only: false,
            search: Some(term.to_string()),
        }
    }

    #[test]
    fn test_filter_search_matches_tags_case_insensitively() {
        assert!(matches_filter(&search("  remote "), &record()));
        assert!(matches_filter(&search("   "), &record()));
    }

    #[test]
    fn test_wildcard_characters_are_literal() {
        assert!(matches_filter(&search("100%"), &record()));
        assert!(!matches_filter(&search("%dev"), &record()));
        assert!(!matches_filter(&search("Front_nd"), &record()));
    }

    #[test]
    fn test_active_filter_excludes_inactive_listing() {
        let mut job = record();
        job.is_active = false;
        let active_only = JobFilter {
            active_only: true,
            search: None,
        };
        assert!(!matches_filter(&active_only, &job));
        assert!(matches_filter(&JobFilter::default(), &job));
    }
}
