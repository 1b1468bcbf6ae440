//! Dashboard route.

use axum::{extract::State, Json};
use chrono::Utc;
use domain::models::DashboardSummary;
use domain::services::{build_dashboard, SubmissionFilter};
use tracing::{info, warn};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::OrgContext;
use crate::services::consultation::{find_matching, scope_for};

/// Organization-wide summary for admins and owners, own production for
/// members.
///
/// GET /api/v1/organizations/:org_id/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    ctx: OrgContext,
) -> Result<Json<DashboardSummary>, ApiError> {
    let cap = state.config.limits.max_export_rows;
    let filter = SubmissionFilter::default();
    let scope = scope_for(&filter, ctx.submission_owner_scope());

    let matches = find_matching(&state.pool, ctx.org_id, &scope, &filter, None, cap, cap).await?;
    if !matches.exhausted {
        warn!(
            organization_id = %ctx.org_id,
            rows = matches.submissions.len(),
            "Dashboard built from a truncated scan"
        );
    }

    let summary = build_dashboard(&matches.submissions, Utc::now().date_naive());

    info!(
        organization_id = %ctx.org_id,
        user_id = %ctx.user_id,
        total_submissions = summary.total_submissions,
        "Fetched dashboard"
    );

    Ok(Json(summary))
}
