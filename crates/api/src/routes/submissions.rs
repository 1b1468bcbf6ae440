//! Submission routes: capture, consultation, export and aggregation.
//!
//! Members only see their own submissions. Admins and owners see the whole
//! organization and may narrow with `submitted_by`.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use domain::models::analytics::{AggregateQuery, AggregateResponse};
use domain::models::submission::{CreateSubmissionRequest, ListSubmissionsResponse, PageQuery};
use domain::models::Submission;
use domain::services::fields::submission_value;
use domain::services::{aggregate, submissions_to_csv, FormSchema, SubmissionFilter};
use persistence::repositories::{SubmissionRepository, TemplateRepository};
use shared::pagination::{clamp_page_size, decode_cursor, encode_cursor};
use shared::validation::parse_date;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{JsonBody, OrgContext, QueryParams};
use crate::middleware::metrics::{record_export, record_submission_created};
use crate::services::consultation::{find_matching, scope_for, Matches};

/// Header set on exports cut at the row cap.
pub const EXPORT_TRUNCATED_HEADER: &str = "x-export-truncated";

/// Rows scanned per row returned before a bulk read gives up.
const SCAN_FACTOR: usize = 4;

fn not_found() -> ApiError {
    ApiError::NotFound("Submission not found".to_string())
}

/// Reads every match up to the export cap. The flag is set when more
/// matches (or unread rows) remain.
async fn collect_all(
    state: &AppState,
    ctx: &OrgContext,
    filter: &SubmissionFilter,
) -> Result<(Vec<Submission>, bool), ApiError> {
    filter.check().map_err(ApiError::Validation)?;

    let cap = state.config.limits.max_export_rows;
    let scope = scope_for(filter, ctx.submission_owner_scope());
    let Matches {
        mut submissions,
        exhausted,
        ..
    } = find_matching(
        &state.pool,
        ctx.org_id,
        &scope,
        filter,
        None,
        cap + 1,
        cap.saturating_mul(SCAN_FACTOR),
    )
    .await?;

    let truncated = submissions.len() > cap || !exhausted;
    submissions.truncate(cap);
    Ok((submissions, truncated))
}

/// Submit a filled form.
///
/// POST /api/v1/organizations/:org_id/submissions
pub async fn create_submission(
    State(state): State<AppState>,
    ctx: OrgContext,
    JsonBody(request): JsonBody<CreateSubmissionRequest>,
) -> Result<(StatusCode, Json<Submission>), ApiError> {
    request.validate()?;

    let template = TemplateRepository::new(state.pool.clone())
        .find_by_id(ctx.org_id, request.template_id)
        .await?
        .filter(|t| t.is_visible_to(ctx.template_viewer()))
        .ok_or_else(|| ApiError::NotFound("Template not found".to_string()))?;

    let form_date = match request.form_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(parse_date(raw).ok_or_else(|| {
            ApiError::Validation(format!("Invalid form_date: {}", raw))
        })?),
    };

    let answers = FormSchema::from_template(&template).validate(&request.answers)?;

    let submission = SubmissionRepository::new(state.pool.clone())
        .create(
            ctx.org_id,
            template.id,
            &template.title,
            &answers,
            form_date,
            ctx.user_id,
        )
        .await?;

    record_submission_created(template.model_type);
    info!(
        organization_id = %ctx.org_id,
        submission_id = %submission.id,
        template_id = %template.id,
        answer_count = submission.answers.len(),
        user_id = %ctx.user_id,
        "Submission created"
    );

    Ok((StatusCode::CREATED, Json(submission)))
}

/// Consult submissions, newest first.
///
/// GET /api/v1/organizations/:org_id/submissions
pub async fn list_submissions(
    State(state): State<AppState>,
    ctx: OrgContext,
    QueryParams(filter): QueryParams<SubmissionFilter>,
    QueryParams(page): QueryParams<PageQuery>,
) -> Result<Json<ListSubmissionsResponse>, ApiError> {
    filter.check().map_err(ApiError::Validation)?;

    let page_size = clamp_page_size(page.limit, state.config.limits.max_page_size);
    let start = page.cursor.as_deref().map(decode_cursor).transpose()?;
    let scope = scope_for(&filter, ctx.submission_owner_scope());

    let matches = find_matching(
        &state.pool,
        ctx.org_id,
        &scope,
        &filter,
        start,
        page_size + 1,
        state.config.limits.max_export_rows,
    )
    .await?;

    let (data, next) = matches.into_page(page_size);
    Ok(Json(ListSubmissionsResponse {
        count: data.len(),
        data,
        next_cursor: next.map(|(at, id)| encode_cursor(at, id)),
    }))
}

/// Get one submission.
///
/// GET /api/v1/organizations/:org_id/submissions/:id
pub async fn get_submission(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path((_, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Submission>, ApiError> {
    let owner = ctx.submission_owner_scope();
    SubmissionRepository::new(state.pool.clone())
        .find_by_id(ctx.org_id, id)
        .await?
        .filter(|s| owner.map_or(true, |user_id| s.submitted_by == user_id))
        .map(Json)
        .ok_or_else(not_found)
}

/// Delete a submission.
///
/// DELETE /api/v1/organizations/:org_id/submissions/:id
pub async fn delete_submission(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path((_, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let repo = SubmissionRepository::new(state.pool.clone());
    let submission = repo.find_by_id(ctx.org_id, id).await?.ok_or_else(not_found)?;

    if !ctx.can_delete_submission(submission.submitted_by) {
        return Err(ApiError::Forbidden(
            "You can only delete your own submissions".to_string(),
        ));
    }

    if !repo.delete(ctx.org_id, id).await? {
        return Err(not_found());
    }

    info!(
        organization_id = %ctx.org_id,
        submission_id = %id,
        user_id = %ctx.user_id,
        "Submission deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Export matching submissions as CSV.
///
/// GET /api/v1/organizations/:org_id/submissions/export
pub async fn export_submissions(
    State(state): State<AppState>,
    ctx: OrgContext,
    QueryParams(filter): QueryParams<SubmissionFilter>,
) -> Result<Response, ApiError> {
    let (submissions, truncated) = collect_all(&state, &ctx, &filter).await?;
    let csv = submissions_to_csv(&submissions)?;

    record_export(submissions.len());
    if truncated {
        warn!(
            organization_id = %ctx.org_id,
            rows = submissions.len(),
            "Export truncated at row cap"
        );
    }

    let filename = format!(
        "attachment; filename=\"submissoes-{}.csv\"",
        Utc::now().format("%Y%m%d-%H%M%S")
    );

    let mut response = (
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        csv,
    )
        .into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&filename) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if truncated {
        headers.insert(EXPORT_TRUNCATED_HEADER, HeaderValue::from_static("true"));
    }

    Ok(response)
}

/// Group matching submissions.
///
/// GET /api/v1/organizations/:org_id/submissions/aggregate
pub async fn aggregate_submissions(
    State(state): State<AppState>,
    ctx: OrgContext,
    QueryParams(query): QueryParams<AggregateQuery>,
    QueryParams(filter): QueryParams<SubmissionFilter>,
) -> Result<Json<AggregateResponse>, ApiError> {
    let (submissions, truncated) = collect_all(&state, &ctx, &filter).await?;

    Ok(Json(AggregateResponse {
        group_by: query.group_by,
        rows: aggregate(&submissions, query.group_by),
        total_count: submissions.len() as i64,
        total_value: submissions.iter().filter_map(submission_value).sum(),
        truncated,
    }))
}
