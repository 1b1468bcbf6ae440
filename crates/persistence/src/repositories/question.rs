//! Question catalog repository.

use domain::models::question::{ListQuestionsQuery, QuestionFields};
use domain::models::Question;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{InputTypeDb, QuestionEntity, QuestionStatusDb};
use crate::metrics::QueryTimer;

const QUESTION_COLUMNS: &str = r#"
    id, organization_id, title, description, input_type, options, status, created_at, updated_at
"#;

/// Repository for an organization's questions.
#[derive(Clone)]
pub struct QuestionRepository {
    pool: PgPool,
}

impl QuestionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a question. A duplicate title surfaces as a unique violation.
    pub async fn create(
        &self,
        organization_id: Uuid,
        fields: &QuestionFields,
    ) -> Result<Question, sqlx::Error> {
        let timer = QueryTimer::new("create_question");
        let query = format!(
            r#"
            INSERT INTO questions (organization_id, title, description, input_type, options, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {QUESTION_COLUMNS}
            "#
        );
        let entity = sqlx::query_as::<_, QuestionEntity>(&query)
            .bind(organization_id)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(InputTypeDb::from(fields.input_type))
            .bind(&fields.options)
            .bind(QuestionStatusDb::from(fields.status))
            .fetch_one(&self.pool)
            .await?;
        timer.record();

        Ok(entity.into())
    }

    /// List questions, optionally filtered by status and input type.
    pub async fn list(
        &self,
        organization_id: Uuid,
        query: &ListQuestionsQuery,
    ) -> Result<Vec<Question>, sqlx::Error> {
        let timer = QueryTimer::new("list_questions");
        let sql = format!(
            r#"
            SELECT {QUESTION_COLUMNS}
            FROM questions
            WHERE organization_id = $1
              AND ($2::question_status IS NULL OR status = $2)
              AND ($3::input_type IS NULL OR input_type = $3)
            ORDER BY LOWER(title)
            "#
        );
        let entities = sqlx::query_as::<_, QuestionEntity>(&sql)
            .bind(organization_id)
            .bind(query.status.map(QuestionStatusDb::from))
            .bind(query.input_type.map(InputTypeDb::from))
            .fetch_all(&self.pool)
            .await?;
        timer.record();

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Find a question by ID within an organization.
    pub async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Question>, sqlx::Error> {
        let timer = QueryTimer::new("find_question_by_id");
        let sql = format!(
            r#"
            SELECT {QUESTION_COLUMNS}
            FROM questions
            WHERE organization_id = $1 AND id = $2
            "#
        );
        let entity = sqlx::query_as::<_, QuestionEntity>(&sql)
            .bind(organization_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        timer.record();

        Ok(entity.map(Into::into))
    }

    /// Load the given questions of an organization. Unknown IDs are skipped.
    pub async fn find_by_ids(
        &self,
        organization_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Question>, sqlx::Error> {
        let timer = QueryTimer::new("find_questions_by_ids");
        let sql = format!(
            r#"
            SELECT {QUESTION_COLUMNS}
            FROM questions
            WHERE organization_id = $1 AND id = ANY($2)
            "#
        );
        let entities = sqlx::query_as::<_, QuestionEntity>(&sql)
            .bind(organization_id)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        timer.record();

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Overwrite a question's fields.
    pub async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        fields: &QuestionFields,
    ) -> Result<Option<Question>, sqlx::Error> {
        let timer = QueryTimer::new("update_question");
        let sql = format!(
            r#"
            UPDATE questions
            SET title = $3, description = $4, input_type = $5, options = $6, status = $7,
                updated_at = NOW()
            WHERE organization_id = $1 AND id = $2
            RETURNING {QUESTION_COLUMNS}
            "#
        );
        let entity = sqlx::query_as::<_, QuestionEntity>(&sql)
            .bind(organization_id)
            .bind(id)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(InputTypeDb::from(fields.input_type))
            .bind(&fields.options)
            .bind(QuestionStatusDb::from(fields.status))
            .fetch_optional(&self.pool)
            .await?;
        timer.record();

        Ok(entity.map(Into::into))
    }

    /// Returns true if any template uses the question.
    pub async fn is_referenced(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("question_is_referenced");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM template_questions WHERE question_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a question.
    pub async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_question");
        let result = sqlx::query("DELETE FROM questions WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
