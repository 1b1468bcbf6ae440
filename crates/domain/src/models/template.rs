//! Template models.
//!
//! A template is an ordered selection of catalog questions, optionally scoped
//! to one business model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::question::{InputType, QuestionStatus};

/// Business model a template (or a team member) is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Credito,
    Imobiliaria,
    Seguro,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Credito => "credito",
            ModelType::Imobiliaria => "imobiliaria",
            ModelType::Seguro => "seguro",
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match shared::text::fold(s).as_str() {
            "credito" => Ok(ModelType::Credito),
            "imobiliaria" => Ok(ModelType::Imobiliaria),
            "seguro" => Ok(ModelType::Seguro),
            _ => Err(format!("Invalid model type: {}", s)),
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A question as it appears inside a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TemplateQuestion {
    pub question_id: Uuid,
    pub position: i32,
    pub title: String,
    pub description: Option<String>,
    pub input_type: InputType,
    pub options: Vec<String>,
    pub status: QuestionStatus,
}

/// A form template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Template {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub model_type: Option<ModelType>,
    pub is_default: bool,
    pub questions: Vec<TemplateQuestion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    pub fn is_visible_to(&self, viewer: Option<ModelType>) -> bool {
        is_visible(self.model_type, viewer)
    }

    pub fn contains_question(&self, question_id: Uuid) -> bool {
        self.questions.iter().any(|q| q.question_id == question_id)
    }
}

/// Visibility rule for business-model scoping.
///
/// Unscoped templates are visible to everyone; an unscoped viewer sees every
/// template; otherwise the scopes must match.
pub fn is_visible(template: Option<ModelType>, viewer: Option<ModelType>) -> bool {
    match (template, viewer) {
        (None, _) | (_, None) => true,
        (Some(t), Some(v)) => t == v,
    }
}

/// Request payload for creating or replacing a template.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct TemplateRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub title: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub model_type: Option<ModelType>,

    #[validate(length(min = 1, message = "A template needs at least one question"))]
    pub question_ids: Vec<Uuid>,

    pub is_default: Option<bool>,
}

/// Query parameters for listing templates.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListTemplatesQuery {
    pub model_type: Option<ModelType>,
}

/// Template listing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TemplateSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub model_type: Option<ModelType>,
    pub is_default: bool,
    pub question_count: i64,
    pub updated_at: DateTime<Utc>,
}

/// Response for template listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListTemplatesResponse {
    pub data: Vec<TemplateSummary>,
    pub count: usize,
}
