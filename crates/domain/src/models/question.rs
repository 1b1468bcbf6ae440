//! Question catalog models.
//!
//! A question is a named, typed form field that organizations reuse across
//! templates. Only `select` and `radio` questions carry enumerated options.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use shared::text::fold;

/// Maximum number of options on a select/radio question.
pub const MAX_OPTIONS: usize = 100;

/// Declared input type of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Date,
    Select,
    Email,
    Tel,
    Number,
    Radio,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Date => "date",
            InputType::Select => "select",
            InputType::Email => "email",
            InputType::Tel => "tel",
            InputType::Number => "number",
            InputType::Radio => "radio",
        }
    }

    /// Returns true for the types whose answers come from an option list.
    pub fn has_options(&self) -> bool {
        matches!(self, InputType::Select | InputType::Radio)
    }
}

impl FromStr for InputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(InputType::Text),
            "date" => Ok(InputType::Date),
            "select" => Ok(InputType::Select),
            "email" => Ok(InputType::Email),
            "tel" => Ok(InputType::Tel),
            "number" => Ok(InputType::Number),
            "radio" => Ok(InputType::Radio),
            _ => Err(format!("Invalid input type: {}", s)),
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a question can be used in new templates and forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    #[default]
    Active,
    Inactive,
}

impl QuestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionStatus::Active => "active",
            QuestionStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reusable question in an organization's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Question {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub input_type: InputType,
    pub options: Vec<String>,
    pub status: QuestionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    pub fn is_active(&self) -> bool {
        self.status == QuestionStatus::Active
    }
}

/// Normalized question fields, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionFields {
    pub title: String,
    pub description: Option<String>,
    pub input_type: InputType,
    pub options: Vec<String>,
    pub status: QuestionStatus,
}

/// Request payload for creating a question.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub title: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub input_type: InputType,

    #[validate(length(max = 100, message = "A question can have at most 100 options"))]
    pub options: Option<Vec<String>>,

    pub status: Option<QuestionStatus>,
}

impl CreateQuestionRequest {
    /// Resolves the request into persistable fields.
    pub fn into_fields(self) -> Result<QuestionFields, String> {
        let options = normalize_options(self.input_type, self.options.unwrap_or_default())?;
        Ok(QuestionFields {
            title: self.title.trim().to_string(),
            description: clean_description(self.description),
            input_type: self.input_type,
            options,
            status: self.status.unwrap_or_default(),
        })
    }
}

/// Request payload for updating a question. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub title: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub input_type: Option<InputType>,

    #[validate(length(max = 100, message = "A question can have at most 100 options"))]
    pub options: Option<Vec<String>>,

    pub status: Option<QuestionStatus>,
}

impl UpdateQuestionRequest {
    /// Merges the update onto the current question.
    ///
    /// Switching a choice question to a free-form type drops its options;
    /// switching to a choice type without supplying options keeps the old
    /// ones, which must then be non-empty.
    pub fn merge_onto(self, current: &Question) -> Result<QuestionFields, String> {
        let input_type = self.input_type.unwrap_or(current.input_type);
        let options = self.options.unwrap_or_else(|| current.options.clone());
        let description = match self.description {
            Some(d) => clean_description(Some(d)),
            None => current.description.clone(),
        };

        Ok(QuestionFields {
            title: self
                .title
                .map(|t| t.trim().to_string())
                .unwrap_or_else(|| current.title.clone()),
            description,
            input_type,
            options: normalize_options(input_type, options)?,
            status: self.status.unwrap_or(current.status),
        })
    }
}

/// Query parameters for listing questions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListQuestionsQuery {
    pub status: Option<QuestionStatus>,
    pub input_type: Option<InputType>,
}

/// Response for question listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListQuestionsResponse {
    pub data: Vec<Question>,
    pub count: usize,
}

/// Cleans an option list for the given input type.
///
/// Options are trimmed, blanks dropped and duplicates (compared folded)
/// removed keeping the first spelling. Non-choice types never keep options.
pub fn normalize_options(input_type: InputType, options: Vec<String>) -> Result<Vec<String>, String> {
    if !input_type.has_options() {
        return Ok(Vec::new());
    }

    let mut seen = std::collections::HashSet::new();
    let cleaned: Vec<String> = options
        .into_iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .filter(|o| seen.insert(fold(o)))
        .collect();

    if cleaned.is_empty() {
        return Err(format!(
            "Questions of type {} require at least one option",
            input_type
        ));
    }
    if cleaned.len() > MAX_OPTIONS {
        return Err(format!("A question can have at most {} options", MAX_OPTIONS));
    }

    Ok(cleaned)
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}
