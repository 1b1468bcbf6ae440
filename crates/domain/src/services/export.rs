//! CSV export of submissions.

use std::collections::HashSet;

use chrono::SecondsFormat;
use thiserror::Error;

use crate::models::Submission;
use shared::text::fold;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Fixed leading columns.
pub const BASE_COLUMNS: [&str; 5] = ["id", "template", "submitted_at", "form_date", "submitted_by"];

/// Renders submissions as CSV.
///
/// After the fixed columns comes one column per distinct answer title
/// (compared folded), in the order titles are first seen.
pub fn submissions_to_csv(submissions: &[Submission]) -> Result<String, ExportError> {
    let mut seen = HashSet::new();
    let mut columns: Vec<(String, String)> = Vec::new();
    for answer in submissions.iter().flat_map(|s| &s.answers) {
        let folded = fold(&answer.question_title);
        if seen.insert(folded.clone()) {
            columns.push((folded, answer.question_title.trim().to_string()));
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());

    let header: Vec<&str> = BASE_COLUMNS
        .iter()
        .copied()
        .chain(columns.iter().map(|(_, title)| title.as_str()))
        .collect();
    writer.write_record(&header)?;

    for submission in submissions {
        let mut record = vec![
            submission.id.to_string(),
            submission.template_title.clone(),
            submission
                .submitted_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            submission
                .form_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            submission.submitted_by_name.clone(),
        ];
        record.extend(
            columns
                .iter()
                .map(|(folded, _)| submission.answer_for(folded).unwrap_or_default().to_string()),
        );
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
