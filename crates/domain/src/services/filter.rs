//! Submission filtering.
//!
//! Text comparisons are case and accent insensitive. All criteria combine
//! with AND; an empty filter matches everything.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Submission;
use crate::services::fields::{submission_value, WellKnownField};
use shared::text::fold;

/// Filter criteria for consulting submissions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SubmissionFilter {
    pub template_id: Option<Uuid>,
    pub submitted_by: Option<Uuid>,
    /// Equality against the `Banco` answer.
    pub bank: Option<String>,
    /// Equality against the `Seguradora` answer.
    pub insurer: Option<String>,
    /// Inclusive lower bound on the `Valor` answer.
    pub min_value: Option<f64>,
    /// Inclusive upper bound on the `Valor` answer.
    pub max_value: Option<f64>,
    /// Substring of the template title or of any answer.
    pub search: Option<String>,
    /// Inclusive lower bound on the effective date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the effective date.
    pub to: Option<NaiveDate>,
}

/// Filter with its needles folded once.
struct Compiled<'a> {
    filter: &'a SubmissionFilter,
    bank: Option<String>,
    insurer: Option<String>,
    search: Option<String>,
}

fn folded_needle(value: &Option<String>) -> Option<String> {
    value.as_deref().map(fold).filter(|v| !v.is_empty())
}

impl SubmissionFilter {
    /// Rejects contradictory bounds.
    pub fn check(&self) -> Result<(), String> {
        for (name, bound) in [("min_value", self.min_value), ("max_value", self.max_value)] {
            if bound.is_some_and(|v| !v.is_finite()) {
                return Err(format!("{} must be a finite number", name));
            }
        }
        if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
            if min > max {
                return Err("min_value must not be greater than max_value".to_string());
            }
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err("from must not be after to".to_string());
            }
        }
        Ok(())
    }

    fn compile(&self) -> Compiled<'_> {
        Compiled {
            filter: self,
            bank: folded_needle(&self.bank),
            insurer: folded_needle(&self.insurer),
            search: folded_needle(&self.search),
        }
    }

    /// Returns true if the submission satisfies every criterion.
    pub fn matches(&self, submission: &Submission) -> bool {
        self.compile().matches(submission)
    }

    /// Keeps the submissions that match, preserving order.
    pub fn apply(&self, submissions: Vec<Submission>) -> Vec<Submission> {
        let compiled = self.compile();
        submissions
            .into_iter()
            .filter(|s| compiled.matches(s))
            .collect()
    }
}

impl Compiled<'_> {
    fn matches(&self, submission: &Submission) -> bool {
        let f = self.filter;

        if f.template_id.is_some_and(|id| id != submission.template_id) {
            return false;
        }
        if f.submitted_by.is_some_and(|id| id != submission.submitted_by) {
            return false;
        }

        if !answer_equals(submission, WellKnownField::Bank, self.bank.as_deref()) {
            return false;
        }
        if !answer_equals(submission, WellKnownField::Insurer, self.insurer.as_deref()) {
            return false;
        }

        if f.min_value.is_some() || f.max_value.is_some() {
            let Some(value) = submission_value(submission) else {
                return false;
            };
            if f.min_value.is_some_and(|min| value < min) {
                return false;
            }
            if f.max_value.is_some_and(|max| value > max) {
                return false;
            }
        }

        if f.from.is_some() || f.to.is_some() {
            let date = submission.effective_date();
            if f.from.is_some_and(|from| date < from) || f.to.is_some_and(|to| date > to) {
                return false;
            }
        }

        if let Some(needle) = &self.search {
            let in_title = fold(&submission.template_title).contains(needle.as_str());
            if !in_title
                && !submission
                    .answers
                    .iter()
                    .any(|a| fold(&a.answer).contains(needle.as_str()))
            {
                return false;
            }
        }

        true
    }
}

fn answer_equals(submission: &Submission, field: WellKnownField, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => field
            .answer(submission)
            .is_some_and(|answer| fold(answer) == needle),
    }
}
