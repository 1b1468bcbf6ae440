//! Grouping submissions into summary rows.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};

use crate::models::{DashboardSummary, GroupBy, Submission, SummaryRow};
use crate::services::fields::{submission_value, WellKnownField};
use shared::text::fold;

/// Key of the group holding submissions without an answer.
pub const MISSING_KEY: &str = "sem_informacao";
/// Label of the group holding submissions without an answer.
pub const MISSING_LABEL: &str = "Sem informação";
/// Number of months in the dashboard series.
pub const DASHBOARD_MONTHS: usize = 12;
/// Rows kept in each dashboard top list.
pub const DASHBOARD_TOP: usize = 5;

fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Key and label of the group a submission falls into.
fn group_of(submission: &Submission, group_by: GroupBy) -> (String, String) {
    let field = match group_by {
        GroupBy::Month => {
            let key = month_key(submission.effective_date());
            return (key.clone(), key);
        }
        GroupBy::User => {
            return (
                submission.submitted_by.to_string(),
                submission.submitted_by_name.clone(),
            )
        }
        GroupBy::Template => {
            return (
                submission.template_id.to_string(),
                submission.template_title.clone(),
            )
        }
        GroupBy::Bank => WellKnownField::Bank,
        GroupBy::Insurer => WellKnownField::Insurer,
        GroupBy::District => WellKnownField::District,
        GroupBy::Agent => WellKnownField::Agent,
    };

    match field.answer(submission) {
        Some(answer) => (fold(answer), answer.to_string()),
        None => (MISSING_KEY.to_string(), MISSING_LABEL.to_string()),
    }
}

/// Groups submissions and reduces each group to a count and a value total.
///
/// Month rows come back in chronological order. Every other grouping is
/// sorted by count descending, then label. A group's label is the first
/// spelling seen for its key.
pub fn aggregate(submissions: &[Submission], group_by: GroupBy) -> Vec<SummaryRow> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<SummaryRow> = Vec::new();

    for submission in submissions {
        let (key, label) = group_of(submission, group_by);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            rows.push(SummaryRow {
                key,
                label,
                count: 0,
                total_value: 0.0,
            });
            rows.len() - 1
        });

        let row = &mut rows[slot];
        row.count += 1;
        row.total_value += submission_value(submission).unwrap_or(0.0);
    }

    if group_by == GroupBy::Month {
        rows.sort_by(|a, b| a.key.cmp(&b.key));
    } else {
        rows.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| fold(&a.label).cmp(&fold(&b.label)))
                .then_with(|| a.label.cmp(&b.label))
        });
    }

    rows
}

/// The `count` months ending with the month of `today`, oldest first.
fn trailing_months(today: NaiveDate, count: usize) -> Vec<String> {
    let current = today.year() * 12 + today.month0() as i32;
    (0..count as i32)
        .rev()
        .map(|back| {
            let index = current - back;
            format!("{:04}-{:02}", index.div_euclid(12), index.rem_euclid(12) + 1)
        })
        .collect()
}

fn top(submissions: &[Submission], group_by: GroupBy) -> Vec<SummaryRow> {
    aggregate(submissions, group_by)
        .into_iter()
        .filter(|row| row.key != MISSING_KEY)
        .take(DASHBOARD_TOP)
        .collect()
}

/// Builds the dashboard summary for a set of submissions.
pub fn build_dashboard(submissions: &[Submission], today: NaiveDate) -> DashboardSummary {
    let current_month = month_key(today);

    let monthly: HashMap<String, SummaryRow> = aggregate(submissions, GroupBy::Month)
        .into_iter()
        .map(|row| (row.key.clone(), row))
        .collect();

    let by_month: Vec<SummaryRow> = trailing_months(today, DASHBOARD_MONTHS)
        .into_iter()
        .map(|key| {
            monthly.get(&key).cloned().unwrap_or(SummaryRow {
                label: key.clone(),
                key,
                count: 0,
                total_value: 0.0,
            })
        })
        .collect();

    let this_month = monthly.get(&current_month);

    DashboardSummary {
        total_submissions: submissions.len() as i64,
        total_value: submissions.iter().filter_map(submission_value).sum(),
        this_month_submissions: this_month.map_or(0, |row| row.count),
        this_month_value: this_month.map_or(0.0, |row| row.total_value),
        by_month,
        top_templates: top(submissions, GroupBy::Template),
        top_banks: top(submissions, GroupBy::Bank),
        top_insurers: top(submissions, GroupBy::Insurer),
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Answer;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn submission(date: (i32, u32, u32), answers: &[(&str, &str)]) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            organization_id: Uuid::nil(),
            template_id: Uuid::nil(),
            template_title: "Crédito habitação".to_string(),
            answers: answers
                .iter()
                .map(|(title, answer)| Answer {
                    question_id: Uuid::new_v4(),
                    question_title: title.to_string(),
                    answer: answer.to_string(),
                })
                .collect(),
            submitted_at: Utc
                .with_ymd_and_hms(date.0, date.1, date.2, 12, 0, 0)
                .unwrap(),
            form_date: None,
            submitted_by: Uuid::nil(),
            submitted_by_name: "Ana".to_string(),
        }
    }

    #[test]
    fn test_group_by_month_chronological() {
        let subs = vec![
            submission((2024, 3, 2), &[("Valor", "100")]),
            submission((2023, 12, 30), &[("Valor", "50")]),
            submission((2024, 3, 20), &[("Valor", "25,5")]),
        ];

        let rows = aggregate(&subs, GroupBy::Month);

        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["2023-12", "2024-03"]);
        assert_eq!(rows[1].count, 2);
        assert!((rows[1].total_value - 125.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_month_uses_form_date() {
        let mut s = submission((2024, 3, 2), &[]);
        s.form_date = NaiveDate::from_ymd_opt(2024, 2, 28);
        let rows = aggregate(&[s], GroupBy::Month);
        assert_eq!(rows[0].key, "2024-02");
    }

    #[test]
    fn test_group_by_bank_folds_and_counts() {
        let subs = vec![
            submission((2024, 1, 1), &[("Banco", "Millennium")]),
            submission((2024, 1, 2), &[("Banco", "CGD")]),
            submission((2024, 1, 3), &[("banco", "millennium ")]),
            submission((2024, 1, 4), &[]),
        ];

        let rows = aggregate(&subs, GroupBy::Bank);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].key, "millennium");
        assert_eq!(rows[0].label, "Millennium");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[1].label, "CGD");
        assert_eq!(rows[2].key, MISSING_KEY);
        assert_eq!(rows[2].label, MISSING_LABEL);
    }

    #[test]
    fn test_ties_sorted_by_label() {
        let subs = vec![
            submission((2024, 1, 1), &[("Distrito", "Porto")]),
            submission((2024, 1, 1), &[("Distrito", "Évora")]),
            submission((2024, 1, 1), &[("Distrito", "Braga")]),
        ];
        let rows = aggregate(&subs, GroupBy::District);
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Braga", "Évora", "Porto"]);
    }

    #[test]
    fn test_group_by_user() {
        let mut rui = submission((2024, 1, 1), &[]);
        rui.submitted_by = Uuid::new_v4();
        rui.submitted_by_name = "Rui".to_string();
        let subs = vec![submission((2024, 1, 1), &[]), rui.clone(), submission((2024, 1, 2), &[])];

        let rows = aggregate(&subs, GroupBy::User);

        assert_eq!(rows[0].label, "Ana");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[1].key, rui.submitted_by.to_string());
    }

    #[test]
    fn test_trailing_months_crosses_year() {
        let months = trailing_months(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(), 4);
        assert_eq!(months, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_dashboard() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let subs = vec![
            submission((2024, 3, 1), &[("Valor", "1000"), ("Banco", "CGD")]),
            submission((2024, 3, 10), &[("Valor", "500"), ("Seguradora", "Fidelidade")]),
            submission((2024, 1, 5), &[("Valor", "n/d")]),
            submission((2022, 1, 5), &[("Valor", "10")]),
        ];

        let dashboard = build_dashboard(&subs, today);

        assert_eq!(dashboard.total_submissions, 4);
        assert!((dashboard.total_value - 1510.0).abs() < f64::EPSILON);
        assert_eq!(dashboard.this_month_submissions, 2);
        assert!((dashboard.this_month_value - 1500.0).abs() < f64::EPSILON);

        assert_eq!(dashboard.by_month.len(), DASHBOARD_MONTHS);
        assert_eq!(dashboard.by_month[0].key, "2023-04");
        assert_eq!(dashboard.by_month[11].key, "2024-03");
        assert_eq!(dashboard.by_month[9].count, 1);
        assert_eq!(dashboard.by_month[10].count, 0);

        assert_eq!(dashboard.top_templates.len(), 1);
        assert_eq!(dashboard.top_templates[0].count, 4);
        assert_eq!(dashboard.top_banks.len(), 1);
        assert_eq!(dashboard.top_insurers[0].label, "Fidelidade");
    }

    #[test]
    fn test_dashboard_empty() {
        let dashboard = build_dashboard(&[], NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(dashboard.total_submissions, 0);
        assert_eq!(dashboard.by_month.len(), DASHBOARD_MONTHS);
        assert!(dashboard.by_month.iter().all(|r| r.count == 0));
        assert!(dashboard.top_banks.is_empty());
    }
}
