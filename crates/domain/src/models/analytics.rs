//! Aggregation and dashboard models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dimension submissions are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Month,
    Bank,
    Insurer,
    District,
    User,
    Agent,
    Template,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Month => "month",
            GroupBy::Bank => "bank",
            GroupBy::Insurer => "insurer",
            GroupBy::District => "district",
            GroupBy::User => "user",
            GroupBy::Agent => "agent",
            GroupBy::Template => "template",
        }
    }
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "month" => Ok(GroupBy::Month),
            "bank" => Ok(GroupBy::Bank),
            "insurer" => Ok(GroupBy::Insurer),
            "district" => Ok(GroupBy::District),
            "user" => Ok(GroupBy::User),
            "agent" => Ok(GroupBy::Agent),
            "template" => Ok(GroupBy::Template),
            _ => Err(format!("Invalid group_by: {}", s)),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One reduced group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SummaryRow {
    /// Stable grouping key (month `YYYY-MM`, folded answer, or an ID).
    pub key: String,
    /// Display label.
    pub label: String,
    pub count: i64,
    /// Sum of parseable `Valor` answers in the group.
    pub total_value: f64,
}

/// Query parameters for the aggregate endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AggregateQuery {
    pub group_by: GroupBy,
}

/// Response for the aggregate endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AggregateResponse {
    pub group_by: GroupBy,
    pub rows: Vec<SummaryRow>,
    pub total_count: i64,
    pub total_value: f64,
    /// Set when the row cap was reached before every match was read.
    pub truncated: bool,
}

/// Dashboard summary for an organization (or a member's own production).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DashboardSummary {
    pub total_submissions: i64,
    pub total_value: f64,
    pub this_month_submissions: i64,
    pub this_month_value: f64,
    /// Last twelve months, oldest first, zero-filled.
    pub by_month: Vec<SummaryRow>,
    pub top_templates: Vec<SummaryRow>,
    pub top_banks: Vec<SummaryRow>,
    pub top_insurers: Vec<SummaryRow>,
    pub generated_at: DateTime<Utc>,
}
