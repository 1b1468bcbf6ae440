//! Template repository.
//!
//! A template row owns its ordered `template_questions`; both are written in
//! one transaction.

use domain::models::template::TemplateSummary;
use domain::models::{ModelType, Template, TemplateQuestion};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::entities::{ModelTypeDb, TemplateEntity, TemplateQuestionEntity, TemplateSummaryEntity};
use crate::metrics::QueryTimer;

/// Template header fields.
#[derive(Debug, Clone)]
pub struct NewTemplate<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub model_type: Option<ModelType>,
    pub is_default: bool,
}

/// Repository for an organization's templates.
#[derive(Clone)]
pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a template with its composed questions.
    pub async fn create(
        &self,
        organization_id: Uuid,
        created_by: Uuid,
        template: &NewTemplate<'_>,
        questions: &[TemplateQuestion],
    ) -> Result<Template, sqlx::Error> {
        let timer = QueryTimer::new("create_template");
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO templates (organization_id, title, description, model_type, is_default, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(organization_id)
        .bind(template.title)
        .bind(template.description)
        .bind(template.model_type.map(ModelTypeDb::from))
        .bind(template.is_default)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        insert_questions(&mut tx, id, questions).await?;
        tx.commit().await?;
        timer.record();

        self.find_by_id(organization_id, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Replace a template's header and question list.
    pub async fn replace(
        &self,
        organization_id: Uuid,
        id: Uuid,
        template: &NewTemplate<'_>,
        questions: &[TemplateQuestion],
    ) -> Result<Option<Template>, sqlx::Error> {
        let timer = QueryTimer::new("replace_template");
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE templates
            SET title = $3, description = $4, model_type = $5, is_default = $6, updated_at = NOW()
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .bind(template.title)
        .bind(template.description)
        .bind(template.model_type.map(ModelTypeDb::from))
        .bind(template.is_default)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        sqlx::query("DELETE FROM template_questions WHERE template_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_questions(&mut tx, id, questions).await?;

        tx.commit().await?;
        timer.record();

        self.find_by_id(organization_id, id).await
    }

    /// Load a template with its questions in position order.
    pub async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Template>, sqlx::Error> {
        let timer = QueryTimer::new("find_template_by_id");
        let entity = sqlx::query_as::<_, TemplateEntity>(
            r#"
            SELECT id, organization_id, title, description, model_type, is_default, created_at, updated_at
            FROM templates
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(entity) = entity else {
            timer.record();
            return Ok(None);
        };

        let questions = sqlx::query_as::<_, TemplateQuestionEntity>(
            r#"
            SELECT tq.template_id, tq.question_id, tq.position,
                   q.title, q.description, q.input_type, q.options, q.status
            FROM template_questions tq
            JOIN questions q ON q.id = tq.question_id
            WHERE tq.template_id = $1
            ORDER BY tq.position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        Ok(Some(entity.into_template(questions)))
    }

    /// List templates a viewer may see.
    ///
    /// `viewer` is the caller's business model (`None` sees everything);
    /// `model_type` optionally narrows the listing to one model.
    pub async fn list(
        &self,
        organization_id: Uuid,
        viewer: Option<ModelType>,
        model_type: Option<ModelType>,
    ) -> Result<Vec<TemplateSummary>, sqlx::Error> {
        let timer = QueryTimer::new("list_templates");
        let entities = sqlx::query_as::<_, TemplateSummaryEntity>(
            r#"
            SELECT t.id, t.title, t.description, t.model_type, t.is_default,
                   (SELECT COUNT(*) FROM template_questions tq WHERE tq.template_id = t.id) AS question_count,
                   t.updated_at
            FROM templates t
            WHERE t.organization_id = $1
              AND ($2::model_type IS NULL OR t.model_type IS NULL OR t.model_type = $2)
              AND ($3::model_type IS NULL OR t.model_type = $3)
            ORDER BY t.is_default DESC, LOWER(t.title)
            "#,
        )
        .bind(organization_id)
        .bind(viewer.map(ModelTypeDb::from))
        .bind(model_type.map(ModelTypeDb::from))
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Delete a template.
    pub async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_template");
        let result = sqlx::query("DELETE FROM templates WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}

async fn insert_questions(
    tx: &mut Transaction<'_, Postgres>,
    template_id: Uuid,
    questions: &[TemplateQuestion],
) -> Result<(), sqlx::Error> {
    let ids: Vec<Uuid> = questions.iter().map(|q| q.question_id).collect();
    let positions: Vec<i32> = questions.iter().map(|q| q.position).collect();

    sqlx::query(
        r#"
        INSERT INTO template_questions (template_id, question_id, position)
        SELECT $1, question_id, position
        FROM UNNEST($2::uuid[], $3::int4[]) AS t(question_id, position)
        "#,
    )
    .bind(template_id)
    .bind(&ids)
    .bind(&positions)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
