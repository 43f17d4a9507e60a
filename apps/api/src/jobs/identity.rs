use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::models::User;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("sign-in rejected: {0}")]
    Rejected(String),
}

/// Resolves the acting user for a session. Used solely to stamp `posted_by`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self, session_id: &str) -> Result<Option<User>, IdentityError>;

    async fn sign_in_anonymously(&self, session_id: &str) -> Result<User, IdentityError>;
}

/// Identity backed by the `users` table, one row per session token.
pub struct PgIdentityProvider {
    pool: PgPool,
}

impl PgIdentityProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    async fn current_user(&self, session_id: &str) -> Result<Option<User>, IdentityError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, is_anonymous, created_at FROM users WHERE session_token = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn sign_in_anonymously(&self, session_id: &str) -> Result<User, IdentityError> {
        if session_id.trim().is_empty() {
            return Err(IdentityError::Rejected("empty session token".to_string()));
        }

        // Upsert so two racing sign-ins for one session resolve to the same user.
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (session_token, is_anonymous)
            VALUES ($1, TRUE)
            ON CONFLICT (session_token) DO UPDATE SET session_token = EXCLUDED.session_token
            RETURNING id, is_anonymous, created_at
            "#,
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;

        info!("Signed in anonymous user {}", user.id);
        Ok(user)
    }
}
