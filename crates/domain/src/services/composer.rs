//! Template composition.
//!
//! Turns the list of question IDs an admin picked into the stored question
//! list of a template. Duplicate titles collapse to their first occurrence,
//! then well-known fields are ranked by the fixed priority list and the rest
//! follow alphabetically.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Question, TemplateQuestion};
use crate::services::fields::{WellKnownField, PRIORITY};
use shared::text::fold;

#[derive(Debug, Error, PartialEq)]
pub enum ComposeError {
    #[error("A template needs at least one question")]
    Empty,

    #[error("A template can have at most {max} questions")]
    TooManyQuestions { max: usize },

    #[error("Question {0} does not exist in this organization")]
    UnknownQuestion(Uuid),

    #[error("Question '{title}' is inactive")]
    InactiveQuestion { id: Uuid, title: String },
}

/// Composes the question list of a template.
///
/// `catalog` must contain every selected question; lookups are by ID, so it
/// may hold more questions than were selected.
pub fn compose(
    selected: &[Uuid],
    catalog: &[Question],
    max_questions: usize,
) -> Result<Vec<TemplateQuestion>, ComposeError> {
    if selected.is_empty() {
        return Err(ComposeError::Empty);
    }

    let by_id: HashMap<Uuid, &Question> = catalog.iter().map(|q| (q.id, q)).collect();

    let mut seen_titles = HashSet::new();
    let mut kept: Vec<&Question> = Vec::with_capacity(selected.len());

    for id in selected {
        let question = by_id
            .get(id)
            .copied()
            .ok_or(ComposeError::UnknownQuestion(*id))?;

        if !question.is_active() {
            return Err(ComposeError::InactiveQuestion {
                id: question.id,
                title: question.title.clone(),
            });
        }

        if seen_titles.insert(fold(&question.title)) {
            kept.push(question);
        }
    }

    if kept.len() > max_questions {
        return Err(ComposeError::TooManyQuestions { max: max_questions });
    }

    kept.sort_by_cached_key(|q| {
        let rank = WellKnownField::from_title(&q.title)
            .map(|f| f.rank())
            .unwrap_or(PRIORITY.len());
        (rank, fold(&q.title), q.title.clone())
    });

    Ok(kept
        .into_iter()
        .enumerate()
        .map(|(position, q)| TemplateQuestion {
            question_id: q.id,
            position: position as i32,
            title: q.title.clone(),
            description: q.description.clone(),
            input_type: q.input_type,
            options: q.options.clone(),
            status: q.status,
        })
        .collect())
}
