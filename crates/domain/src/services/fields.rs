//! Well-known question titles.
//!
//! Production tracking depends on a handful of questions every business
//! model asks. They are identified by title, compared folded, and their order
//! here is the fixed priority used when composing templates.

use crate::models::Submission;
use shared::text::fold;
use shared::validation::parse_amount;

/// A question title with a meaning for filters, aggregation and composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellKnownField {
    ClientName,
    TaxNumber,
    Email,
    Phone,
    Date,
    Bank,
    Insurer,
    Value,
    District,
    Agent,
}

/// Composition priority order.
pub const PRIORITY: [WellKnownField; 10] = [
    WellKnownField::ClientName,
    WellKnownField::TaxNumber,
    WellKnownField::Email,
    WellKnownField::Phone,
    WellKnownField::Date,
    WellKnownField::Bank,
    WellKnownField::Insurer,
    WellKnownField::Value,
    WellKnownField::District,
    WellKnownField::Agent,
];

impl WellKnownField {
    /// Folded title the field is recognised by.
    pub fn folded_title(&self) -> &'static str {
        match self {
            WellKnownField::ClientName => "nome do cliente",
            WellKnownField::TaxNumber => "nif",
            WellKnownField::Email => "email",
            WellKnownField::Phone => "telefone",
            WellKnownField::Date => "data",
            WellKnownField::Bank => "banco",
            WellKnownField::Insurer => "seguradora",
            WellKnownField::Value => "valor",
            WellKnownField::District => "distrito",
            WellKnownField::Agent => "agente",
        }
    }

    /// Finds the field a question title refers to.
    pub fn from_title(title: &str) -> Option<Self> {
        let folded = fold(title);
        PRIORITY
            .iter()
            .copied()
            .find(|f| f.folded_title() == folded)
    }

    /// Rank in the composition priority list.
    pub fn rank(&self) -> usize {
        PRIORITY
            .iter()
            .position(|f| f == self)
            .unwrap_or(PRIORITY.len())
    }

    /// Non-blank answer to this field in a submission.
    pub fn answer<'a>(&self, submission: &'a Submission) -> Option<&'a str> {
        submission.answer_for(self.folded_title())
    }
}

/// Parsed `Valor` answer of a submission.
pub fn submission_value(submission: &Submission) -> Option<f64> {
    WellKnownField::Value
        .answer(submission)
        .and_then(parse_amount)
}
