//! Template entities (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::member::ModelTypeDb;
use super::question::{InputTypeDb, QuestionStatusDb};

/// Database row mapping for the templates table.
#[derive(Debug, Clone, FromRow)]
pub struct TemplateEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub model_type: Option<ModelTypeDb>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TemplateEntity {
    /// Assembles the domain template from its row and question rows.
    pub fn into_template(self, questions: Vec<TemplateQuestionEntity>) -> domain::models::Template {
        domain::models::Template {
            id: self.id,
            organization_id: self.organization_id,
            title: self.title,
            description: self.description,
            model_type: self.model_type.map(Into::into),
            is_default: self.is_default,
            questions: questions.into_iter().map(Into::into).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// template_questions row joined with the question it references.
#[derive(Debug, Clone, FromRow)]
pub struct TemplateQuestionEntity {
    pub template_id: Uuid,
    pub question_id: Uuid,
    pub position: i32,
    pub title: String,
    pub description: Option<String>,
    pub input_type: InputTypeDb,
    pub options: Vec<String>,
    pub status: QuestionStatusDb,
}

impl From<TemplateQuestionEntity> for domain::models::TemplateQuestion {
    fn from(entity: TemplateQuestionEntity) -> Self {
        Self {
            question_id: entity.question_id,
            position: entity.position,
            title: entity.title,
            description: entity.description,
            input_type: entity.input_type.into(),
            options: entity.options,
            status: entity.status.into(),
        }
    }
}

/// Template listing row with its question count.
#[derive(Debug, Clone, FromRow)]
pub struct TemplateSummaryEntity {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub model_type: Option<ModelTypeDb>,
    pub is_default: bool,
    pub question_count: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<TemplateSummaryEntity> for domain::models::template::TemplateSummary {
    fn from(entity: TemplateSummaryEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            model_type: entity.model_type.map(Into::into),
            is_default: entity.is_default,
            question_count: entity.question_count,
            updated_at: entity.updated_at,
        }
    }
}
