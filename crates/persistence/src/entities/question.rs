//! Question catalog entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{InputType, QuestionStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for input_type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "input_type", rename_all = "lowercase")]
pub enum InputTypeDb {
    Text,
    Date,
    Select,
    Email,
    Tel,
    Number,
    Radio,
}

impl From<InputTypeDb> for InputType {
    fn from(db: InputTypeDb) -> Self {
        match db {
            InputTypeDb::Text => Self::Text,
            InputTypeDb::Date => Self::Date,
            InputTypeDb::Select => Self::Select,
            InputTypeDb::Email => Self::Email,
            InputTypeDb::Tel => Self::Tel,
            InputTypeDb::Number => Self::Number,
            InputTypeDb::Radio => Self::Radio,
        }
    }
}

impl From<InputType> for InputTypeDb {
    fn from(domain: InputType) -> Self {
        match domain {
            InputType::Text => Self::Text,
            InputType::Date => Self::Date,
            InputType::Select => Self::Select,
            InputType::Email => Self::Email,
            InputType::Tel => Self::Tel,
            InputType::Number => Self::Number,
            InputType::Radio => Self::Radio,
        }
    }
}

/// Database enum for question_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "question_status", rename_all = "lowercase")]
pub enum QuestionStatusDb {
    Active,
    Inactive,
}

impl From<QuestionStatusDb> for QuestionStatus {
    fn from(db: QuestionStatusDb) -> Self {
        match db {
            QuestionStatusDb::Active => Self::Active,
            QuestionStatusDb::Inactive => Self::Inactive,
        }
    }
}

impl From<QuestionStatus> for QuestionStatusDb {
    fn from(domain: QuestionStatus) -> Self {
        match domain {
            QuestionStatus::Active => Self::Active,
            QuestionStatus::Inactive => Self::Inactive,
        }
    }
}

/// Database row mapping for the questions table.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub input_type: InputTypeDb,
    pub options: Vec<String>,
    pub status: QuestionStatusDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<QuestionEntity> for domain::models::Question {
    fn from(entity: QuestionEntity) -> Self {
        Self {
            id: entity.id,
            organization_id: entity.organization_id,
            title: entity.title,
            description: entity.description,
            input_type: entity.input_type.into(),
            options: entity.options,
            status: entity.status.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
