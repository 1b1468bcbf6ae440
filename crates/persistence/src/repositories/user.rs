//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{MembershipEntity, UserEntity};
use crate::metrics::QueryTimer;

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, password_hash, display_name, is_active,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by email address (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, password_hash, display_name, is_active,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create a new user account. The email is stored lowercased.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        display_name: &str,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (email, password_hash, display_name)
            VALUES (LOWER($1), $2, $3)
            RETURNING id, email, password_hash, display_name, is_active,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update user's last login timestamp.
    pub async fn update_last_login(
        &self,
        user_id: Uuid,
        last_login_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("update_user_last_login");
        sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(last_login_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    /// List the organizations a user belongs to.
    pub async fn list_memberships(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<MembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_user_memberships");
        let result = sqlx::query_as::<_, MembershipEntity>(
            r#"
            SELECT m.organization_id, o.name AS organization_name, m.role, m.model_type
            FROM organization_members m
            JOIN organizations o ON o.id = m.organization_id
            WHERE m.user_id = $1
            ORDER BY o.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
