//! Template routes.
//!
//! Writes compose the selected questions (de-duplicated and ranked) before
//! storing them. Members with a business model only see matching templates;
//! hidden templates answer 404.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::template::{ListTemplatesQuery, ListTemplatesResponse, TemplateRequest};
use domain::models::{Template, TemplateQuestion};
use domain::services::{compose, FormSchema};
use persistence::repositories::{
    NewTemplate, QuestionRepository, SubmissionRepository, TemplateRepository,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{JsonBody, OrgContext, QueryParams};
use crate::middleware::metrics::record_template_composed;

fn not_found() -> ApiError {
    ApiError::NotFound("Template not found".to_string())
}

/// Loads a template the caller is allowed to see.
async fn find_visible(state: &AppState, ctx: &OrgContext, id: Uuid) -> Result<Template, ApiError> {
    TemplateRepository::new(state.pool.clone())
        .find_by_id(ctx.org_id, id)
        .await?
        .filter(|t| t.is_visible_to(ctx.template_viewer()))
        .ok_or_else(not_found)
}

/// Composes the requested question list against the catalog.
async fn compose_request(
    state: &AppState,
    ctx: &OrgContext,
    request: &TemplateRequest,
) -> Result<Vec<TemplateQuestion>, ApiError> {
    let catalog = QuestionRepository::new(state.pool.clone())
        .find_by_ids(ctx.org_id, &request.question_ids)
        .await?;

    let questions = compose(
        &request.question_ids,
        &catalog,
        state.config.limits.max_questions_per_template,
    )?;
    record_template_composed(questions.len());
    Ok(questions)
}

fn header(request: &TemplateRequest, is_default: bool) -> NewTemplate<'_> {
    NewTemplate {
        title: request.title.trim(),
        description: request
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty()),
        model_type: request.model_type,
        is_default,
    }
}

/// List visible templates.
///
/// GET /api/v1/organizations/:org_id/templates
pub async fn list_templates(
    State(state): State<AppState>,
    ctx: OrgContext,
    QueryParams(query): QueryParams<ListTemplatesQuery>,
) -> Result<Json<ListTemplatesResponse>, ApiError> {
    let data = TemplateRepository::new(state.pool.clone())
        .list(ctx.org_id, ctx.template_viewer(), query.model_type)
        .await?;

    Ok(Json(ListTemplatesResponse {
        count: data.len(),
        data,
    }))
}

/// Create a template from a question selection.
///
/// POST /api/v1/organizations/:org_id/templates
pub async fn create_template(
    State(state): State<AppState>,
    ctx: OrgContext,
    JsonBody(request): JsonBody<TemplateRequest>,
) -> Result<(StatusCode, Json<Template>), ApiError> {
    ctx.require_catalog_manager()?;
    request.validate()?;

    let questions = compose_request(&state, &ctx, &request).await?;
    let template = TemplateRepository::new(state.pool.clone())
        .create(
            ctx.org_id,
            ctx.user_id,
            &header(&request, request.is_default.unwrap_or(false)),
            &questions,
        )
        .await?;

    info!(
        organization_id = %ctx.org_id,
        template_id = %template.id,
        question_count = template.questions.len(),
        model_type = ?template.model_type,
        user_id = %ctx.user_id,
        "Template created"
    );

    Ok((StatusCode::CREATED, Json(template)))
}

/// Get a template with its questions.
///
/// GET /api/v1/organizations/:org_id/templates/:id
pub async fn get_template(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path((_, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Template>, ApiError> {
    find_visible(&state, &ctx, id).await.map(Json)
}

/// Replace a template's header and question list.
///
/// PUT /api/v1/organizations/:org_id/templates/:id
pub async fn update_template(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path((_, id)): Path<(Uuid, Uuid)>,
    JsonBody(request): JsonBody<TemplateRequest>,
) -> Result<Json<Template>, ApiError> {
    ctx.require_catalog_manager()?;
    request.validate()?;

    let repo = TemplateRepository::new(state.pool.clone());
    let current = repo
        .find_by_id(ctx.org_id, id)
        .await?
        .ok_or_else(not_found)?;

    let questions = compose_request(&state, &ctx, &request).await?;
    let is_default = request.is_default.unwrap_or(current.is_default);
    let template = repo
        .replace(ctx.org_id, id, &header(&request, is_default), &questions)
        .await?
        .ok_or_else(not_found)?;

    info!(
        organization_id = %ctx.org_id,
        template_id = %id,
        question_count = template.questions.len(),
        user_id = %ctx.user_id,
        "Template updated"
    );

    Ok(Json(template))
}

/// Delete a template that is not default and has no submissions.
///
/// DELETE /api/v1/organizations/:org_id/templates/:id
pub async fn delete_template(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path((_, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    ctx.require_catalog_manager()?;

    let repo = TemplateRepository::new(state.pool.clone());
    let template = repo
        .find_by_id(ctx.org_id, id)
        .await?
        .ok_or_else(not_found)?;

    if template.is_default {
        return Err(ApiError::Conflict(
            "Default templates cannot be deleted".to_string(),
        ));
    }

    let submissions = SubmissionRepository::new(state.pool.clone())
        .count_for_template(id)
        .await?;
    if submissions > 0 {
        return Err(ApiError::Conflict(format!(
            "Template has {} submissions and cannot be deleted",
            submissions
        )));
    }

    if !repo.delete(ctx.org_id, id).await? {
        return Err(not_found());
    }

    info!(
        organization_id = %ctx.org_id,
        template_id = %id,
        user_id = %ctx.user_id,
        "Template deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Form schema generated from the template's active questions.
///
/// GET /api/v1/organizations/:org_id/templates/:id/schema
pub async fn get_template_schema(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path((_, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<FormSchema>, ApiError> {
    let template = find_visible(&state, &ctx, id).await?;
    Ok(Json(FormSchema::from_template(&template)))
}
