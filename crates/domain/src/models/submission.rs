//! Submission models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::text::fold;

/// One stored answer.
///
/// `question_title` is the title the question had when the form was filled,
/// so filters and exports keep working after the catalog changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Answer {
    pub question_id: Uuid,
    pub question_title: String,
    pub answer: String,
}

/// A filled form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Submission {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub template_id: Uuid,
    pub template_title: String,
    pub answers: Vec<Answer>,
    pub submitted_at: DateTime<Utc>,
    /// Business-effective date, distinct from the submission time.
    pub form_date: Option<NaiveDate>,
    pub submitted_by: Uuid,
    pub submitted_by_name: String,
}

impl Submission {
    /// `form_date` when present, otherwise the day the form was submitted.
    pub fn effective_date(&self) -> NaiveDate {
        self.form_date
            .unwrap_or_else(|| self.submitted_at.date_naive())
    }

    /// Returns the first non-blank answer whose question title folds to
    /// `folded_title`.
    pub fn answer_for(&self, folded_title: &str) -> Option<&str> {
        self.answers
            .iter()
            .filter(|a| fold(&a.question_title) == folded_title)
            .map(|a| a.answer.trim())
            .find(|a| !a.is_empty())
    }
}

/// Answer as posted by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnswerInput {
    pub question_id: Uuid,
    pub answer: String,
}

/// Request payload for submitting a form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateSubmissionRequest {
    pub template_id: Uuid,

    #[validate(length(min = 1, max = 500, message = "Between 1 and 500 answers are required"))]
    pub answers: Vec<AnswerInput>,

    /// `YYYY-MM-DD` or `DD/MM/YYYY`.
    pub form_date: Option<String>,
}

/// Cursor pagination parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PageQuery {
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

/// Response for submission listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListSubmissionsResponse {
    pub data: Vec<Submission>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}
