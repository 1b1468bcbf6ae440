//! Submission consultation.
//!
//! The indexed criteria (template, submitter, effective date) run in SQL;
//! answer-level criteria run on each fetched batch. Batches are read newest
//! first until enough matches are found, the rows run out, or the scan cap
//! is reached.

use chrono::{DateTime, Utc};
use domain::models::Submission;
use domain::services::SubmissionFilter;
use persistence::repositories::{SubmissionRepository, SubmissionScope};
use sqlx::PgPool;
use uuid::Uuid;

/// Rows fetched per round trip.
const BATCH_SIZE: usize = 500;

/// Keyset position `(submitted_at, id)` in the newest-first ordering.
pub type Position = (DateTime<Utc>, Uuid);

/// Outcome of a consultation.
#[derive(Debug, Default)]
pub struct Matches {
    /// Matching submissions, newest first.
    pub submissions: Vec<Submission>,
    /// Position of the last row read.
    pub scanned_to: Option<Position>,
    /// Every row after the start position was read.
    pub exhausted: bool,
}

impl Matches {
    /// Cursor for the next page of `page_size`, trimming the lookahead row.
    pub fn into_page(mut self, page_size: usize) -> (Vec<Submission>, Option<Position>) {
        if self.submissions.len() > page_size {
            self.submissions.truncate(page_size);
            let next = self.submissions.last().map(|s| (s.submitted_at, s.id));
            (self.submissions, next)
        } else if self.exhausted {
            (self.submissions, None)
        } else {
            // Scan cap reached: resume after the last row read
            (self.submissions, self.scanned_to)
        }
    }
}

/// Builds the SQL scope for a filter, restricted to `owner` when set.
pub fn scope_for(filter: &SubmissionFilter, owner: Option<Uuid>) -> SubmissionScope {
    SubmissionScope {
        template_id: filter.template_id,
        submitted_by: owner.or(filter.submitted_by),
        from: filter.from,
        to: filter.to,
    }
}

/// Reads up to `max_scan` rows after `start` and keeps up to `want` matches.
pub async fn find_matching(
    pool: &PgPool,
    organization_id: Uuid,
    scope: &SubmissionScope,
    filter: &SubmissionFilter,
    start: Option<Position>,
    want: usize,
    max_scan: usize,
) -> Result<Matches, sqlx::Error> {
    let repo = SubmissionRepository::new(pool.clone());
    let mut matches = Matches {
        scanned_to: start,
        ..Matches::default()
    };
    let mut scanned = 0;

    while matches.submissions.len() < want {
        let limit = BATCH_SIZE.min(max_scan.saturating_sub(scanned));
        if limit == 0 {
            break;
        }

        let rows = repo
            .list(organization_id, scope, matches.scanned_to, limit as i64)
            .await?;
        let fetched = rows.len();
        scanned += fetched;
        if let Some(last) = rows.last() {
            matches.scanned_to = Some((last.submitted_at, last.id));
        }

        let room = want - matches.submissions.len();
        matches
            .submissions
            .extend(filter.apply(rows).into_iter().take(room));

        if fetched < limit {
            matches.exhausted = true;
            break;
        }
    }

    Ok(matches)
}
