//! Durable storage for job listings.
//!
//! `JobRecordStore` is the seam the lifecycle manager talks to; `PgJobStore`
//! is the production backend. The store assigns ids and timestamps.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::{JobFields, JobFilter, JobPatch, JobRecord, JobRow};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("job {0} does not exist")]
    NotFound(Uuid),

    #[error("invalid job row: {0}")]
    InvalidRow(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

#[async_trait]
pub trait JobRecordStore: Send + Sync {
    /// Returns matching records, newest `created_at` first.
    async fn list(&self, filter: &JobFilter) -> Result<Vec<JobRecord>, StoreError>;

    /// Inserts a new record. The store assigns `id`, `created_at` and `updated_at`.
    async fn insert(&self, fields: JobFields) -> Result<JobRecord, StoreError>;

    /// Applies `patch` to an existing record. Fails with `NotFound` when `id` is unknown.
    async fn update(&self, id: Uuid, patch: JobPatch) -> Result<(), StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

const JOB_COLUMNS: &str = "id, title, company, location, type, salary, description, \
    requirements, tags, posted_by, is_active, created_at, updated_at";

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `%term%` with LIKE wildcards in `term` matched literally (escape char `\`).
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn into_record(row: JobRow) -> Result<JobRecord, StoreError> {
    JobRecord::try_from(row).map_err(StoreError::InvalidRow)
}

#[async_trait]
impl JobRecordStore for PgJobStore {
    async fn list(&self, filter: &JobFilter) -> Result<Vec<JobRecord>, StoreError> {
        let pattern = filter.search_term().map(like_pattern);

        let rows = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE ($1 = FALSE OR is_active)
              AND ($2::TEXT IS NULL
                   OR title ILIKE $2 ESCAPE '\'
                   OR company ILIKE $2 ESCAPE '\'
                   OR location ILIKE $2 ESCAPE '\'
                   OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE $2 ESCAPE '\'))
            ORDER BY created_at DESC
            "#
        ))
        .bind(filter.active_only)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} job rows", rows.len());
        rows.into_iter().map(into_record).collect()
    }

    async fn insert(&self, fields: JobFields) -> Result<JobRecord, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            INSERT INTO jobs
                (title, company, location, type, salary, description, requirements, tags, posted_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(&fields.title)
        .bind(&fields.company)
        .bind(&fields.location)
        .bind(fields.job_type.as_str())
        .bind(&fields.salary)
        .bind(&fields.description)
        .bind(&fields.requirements)
        .bind(&fields.tags)
        .bind(fields.posted_by)
        .fetch_one(&self.pool)
        .await?;

        into_record(row)
    }

    async fn update(&self, id: Uuid, patch: JobPatch) -> Result<(), StoreError> {
        let result = match patch {
            JobPatch::Fields(fields) => {
                sqlx::query(
                    r#"
                    UPDATE jobs
                    SET title = $2, company = $3, location = $4, type = $5, salary = $6,
                        description = $7, requirements = $8, tags = $9, posted_by = $10,
                        updated_at = now()
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .bind(&fields.title)
                .bind(&fields.company)
                .bind(&fields.location)
                .bind(fields.job_type.as_str())
                .bind(&fields.salary)
                .bind(&fields.description)
                .bind(&fields.requirements)
                .bind(&fields.tags)
                .bind(fields.posted_by)
                .execute(&self.pool)
                .await?
            }
            JobPatch::Active(is_active) => {
                sqlx::query("UPDATE jobs SET is_active = $2, updated_at = now() WHERE id = $1")
                    .bind(id)
                    .bind(is_active)
                    .execute(&self.pool)
                    .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        // Deleting an already-deleted listing is not an error.
        if result.rows_affected() == 0 {
            debug!("Delete of job {id} matched no rows");
        }
        Ok(())
    }
}
