//! Submission entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::Answer;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// submissions row joined with the submitter's display name.
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub template_id: Uuid,
    pub template_title: String,
    pub answers: Json<Vec<Answer>>,
    pub form_date: Option<NaiveDate>,
    pub submitted_by: Uuid,
    pub submitted_by_name: String,
    pub submitted_at: DateTime<Utc>,
}

impl From<SubmissionEntity> for domain::models::Submission {
    fn from(entity: SubmissionEntity) -> Self {
        Self {
            id: entity.id,
            organization_id: entity.organization_id,
            template_id: entity.template_id,
            template_title: entity.template_title,
            answers: entity.answers.0,
            submitted_at: entity.submitted_at,
            form_date: entity.form_date,
            submitted_by: entity.submitted_by,
            submitted_by_name: entity.submitted_by_name,
        }
    }
}
