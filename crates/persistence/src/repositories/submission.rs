//! Submission repository.
//!
//! Listing is keyset-paginated on `(submitted_at, id)` descending. Only the
//! indexed criteria are applied in SQL; answer-level filters run in the
//! domain layer on the fetched rows.

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{Answer, Submission};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SubmissionEntity;
use crate::metrics::QueryTimer;

/// Criteria applied in SQL when listing submissions.
#[derive(Debug, Clone, Default)]
pub struct SubmissionScope {
    pub template_id: Option<Uuid>,
    pub submitted_by: Option<Uuid>,
    /// Inclusive lower bound on the effective date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the effective date.
    pub to: Option<NaiveDate>,
}

/// Repository for submissions.
#[derive(Clone)]
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a validated submission.
    pub async fn create(
        &self,
        organization_id: Uuid,
        template_id: Uuid,
        template_title: &str,
        answers: &[Answer],
        form_date: Option<NaiveDate>,
        submitted_by: Uuid,
    ) -> Result<Submission, sqlx::Error> {
        let timer = QueryTimer::new("create_submission");
        let entity = sqlx::query_as::<_, SubmissionEntity>(
            r#"
            WITH inserted AS (
                INSERT INTO submissions (organization_id, template_id, template_title, answers, form_date, submitted_by)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT i.id, i.organization_id, i.template_id, i.template_title, i.answers,
                   i.form_date, i.submitted_by, u.display_name AS submitted_by_name, i.submitted_at
            FROM inserted i
            JOIN users u ON u.id = i.submitted_by
            "#,
        )
        .bind(organization_id)
        .bind(template_id)
        .bind(template_title)
        .bind(Json(answers))
        .bind(form_date)
        .bind(submitted_by)
        .fetch_one(&self.pool)
        .await?;
        timer.record();

        Ok(entity.into())
    }

    /// Find a submission by ID within an organization.
    pub async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Submission>, sqlx::Error> {
        let timer = QueryTimer::new("find_submission_by_id");
        let entity = sqlx::query_as::<_, SubmissionEntity>(
            r#"
            SELECT s.id, s.organization_id, s.template_id, s.template_title, s.answers,
                   s.form_date, s.submitted_by, u.display_name AS submitted_by_name, s.submitted_at
            FROM submissions s
            JOIN users u ON u.id = s.submitted_by
            WHERE s.organization_id = $1 AND s.id = $2
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();

        Ok(entity.map(Into::into))
    }

    /// Fetch up to `limit` submissions newest first, strictly after the
    /// `before` keyset position when given.
    pub async fn list(
        &self,
        organization_id: Uuid,
        scope: &SubmissionScope,
        before: Option<(DateTime<Utc>, Uuid)>,
        limit: i64,
    ) -> Result<Vec<Submission>, sqlx::Error> {
        let timer = QueryTimer::new("list_submissions");
        let entities = sqlx::query_as::<_, SubmissionEntity>(
            r#"
            SELECT s.id, s.organization_id, s.template_id, s.template_title, s.answers,
                   s.form_date, s.submitted_by, u.display_name AS submitted_by_name, s.submitted_at
            FROM submissions s
            JOIN users u ON u.id = s.submitted_by
            WHERE s.organization_id = $1
              AND ($2::uuid IS NULL OR s.template_id = $2)
              AND ($3::uuid IS NULL OR s.submitted_by = $3)
              AND ($4::date IS NULL OR COALESCE(s.form_date, (s.submitted_at AT TIME ZONE 'UTC')::date) >= $4)
              AND ($5::date IS NULL OR COALESCE(s.form_date, (s.submitted_at AT TIME ZONE 'UTC')::date) <= $5)
              AND ($6::timestamptz IS NULL OR (s.submitted_at, s.id) < ($6, $7))
            ORDER BY s.submitted_at DESC, s.id DESC
            LIMIT $8
            "#,
        )
        .bind(organization_id)
        .bind(scope.template_id)
        .bind(scope.submitted_by)
        .bind(scope.from)
        .bind(scope.to)
        .bind(before.map(|(at, _)| at))
        .bind(before.map(|(_, id)| id))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Count submissions filled against a template.
    pub async fn count_for_template(&self, template_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_submissions_for_template");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM submissions WHERE template_id = $1",
        )
        .bind(template_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a submission.
    pub async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_submission");
        let result = sqlx::query("DELETE FROM submissions WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
