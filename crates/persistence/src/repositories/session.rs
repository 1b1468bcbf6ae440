//! Session repository backing refresh token rotation.
//!
//! Sessions never store tokens, only SHA-256 hashes of their JTIs.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UserSessionEntity;
use crate::metrics::QueryTimer;

/// Repository for user_sessions.
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user session.
    pub async fn create(
        &self,
        user_id: Uuid,
        token_hash: &str,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<UserSessionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user_session");
        let result = sqlx::query_as::<_, UserSessionEntity>(
            r#"
            INSERT INTO user_sessions (user_id, token_hash, refresh_token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, token_hash, refresh_token_hash, expires_at, created_at, last_used_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(refresh_token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find the session a refresh token belongs to.
    pub async fn find_by_refresh_hash(
        &self,
        refresh_token_hash: &str,
        user_id: Uuid,
    ) -> Result<Option<UserSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_session_by_refresh_hash");
        let result = sqlx::query_as::<_, UserSessionEntity>(
            r#"
            SELECT id, user_id, token_hash, refresh_token_hash, expires_at, created_at, last_used_at
            FROM user_sessions
            WHERE refresh_token_hash = $1 AND user_id = $2
            "#,
        )
        .bind(refresh_token_hash)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Swap a session's token hashes after rotation.
    ///
    /// Matches on the previous refresh hash so that two concurrent refreshes
    /// with the same token cannot both succeed.
    pub async fn rotate(
        &self,
        session_id: Uuid,
        previous_refresh_hash: &str,
        token_hash: &str,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("rotate_user_session");
        let result = sqlx::query(
            r#"
            UPDATE user_sessions
            SET token_hash = $3, refresh_token_hash = $4, expires_at = $5, last_used_at = NOW()
            WHERE id = $1 AND refresh_token_hash = $2
            "#,
        )
        .bind(session_id)
        .bind(previous_refresh_hash)
        .bind(token_hash)
        .bind(refresh_token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Delete a session by ID.
    pub async fn delete(&self, session_id: Uuid) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("delete_user_session");
        sqlx::query("DELETE FROM user_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(())
    }

    /// Delete the session a refresh token belongs to.
    pub async fn delete_by_refresh_hash(
        &self,
        refresh_token_hash: &str,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_session_by_refresh_hash");
        let result = sqlx::query(
            "DELETE FROM user_sessions WHERE refresh_token_hash = $1 AND user_id = $2",
        )
        .bind(refresh_token_hash)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Revoke all sessions for a user.
    pub async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("revoke_all_sessions");
        let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
