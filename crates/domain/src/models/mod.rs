//! Domain models for Prodesk.

pub mod analytics;
pub mod organization;
pub mod question;
pub mod submission;
pub mod template;
pub mod user;

pub use analytics::{DashboardSummary, GroupBy, SummaryRow};
pub use organization::{Member, OrgRole, Organization};
pub use question::{InputType, Question, QuestionStatus};
pub use submission::{Answer, AnswerInput, Submission};
pub use template::{ModelType, Template, TemplateQuestion};
pub use user::User;

use serde::{Deserialize, Deserializer};

/// Deserializes a present field as `Some(value)`, including `Some(None)` for
/// an explicit `null`. Used with `#[serde(default)]` so PATCH bodies can tell
/// "absent" apart from "clear this value".
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
