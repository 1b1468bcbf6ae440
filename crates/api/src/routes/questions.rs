//! Question catalog routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::question::{
    CreateQuestionRequest, ListQuestionsQuery, ListQuestionsResponse, UpdateQuestionRequest,
};
use domain::models::Question;
use persistence::repositories::QuestionRepository;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{JsonBody, OrgContext, QueryParams};

/// Maps the case-insensitive title index violation to a readable conflict.
fn title_conflict(err: sqlx::Error) -> ApiError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            ApiError::Conflict("A question with this title already exists".to_string())
        }
        _ => err.into(),
    }
}

/// List the catalog.
///
/// GET /api/v1/organizations/:org_id/questions
pub async fn list_questions(
    State(state): State<AppState>,
    ctx: OrgContext,
    QueryParams(query): QueryParams<ListQuestionsQuery>,
) -> Result<Json<ListQuestionsResponse>, ApiError> {
    let data = QuestionRepository::new(state.pool.clone())
        .list(ctx.org_id, &query)
        .await?;

    Ok(Json(ListQuestionsResponse {
        count: data.len(),
        data,
    }))
}

/// Create a question.
///
/// POST /api/v1/organizations/:org_id/questions
pub async fn create_question(
    State(state): State<AppState>,
    ctx: OrgContext,
    JsonBody(request): JsonBody<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<Question>), ApiError> {
    ctx.require_catalog_manager()?;
    request.validate()?;
    let fields = request.into_fields().map_err(ApiError::Validation)?;

    let question = QuestionRepository::new(state.pool.clone())
        .create(ctx.org_id, &fields)
        .await
        .map_err(title_conflict)?;

    info!(
        organization_id = %ctx.org_id,
        question_id = %question.id,
        input_type = %question.input_type,
        user_id = %ctx.user_id,
        "Question created"
    );

    Ok((StatusCode::CREATED, Json(question)))
}

/// Get a question.
///
/// GET /api/v1/organizations/:org_id/questions/:id
pub async fn get_question(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path((_, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Question>, ApiError> {
    QuestionRepository::new(state.pool.clone())
        .find_by_id(ctx.org_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))
}

/// Partially update a question.
///
/// PATCH /api/v1/organizations/:org_id/questions/:id
pub async fn update_question(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path((_, id)): Path<(Uuid, Uuid)>,
    JsonBody(request): JsonBody<UpdateQuestionRequest>,
) -> Result<Json<Question>, ApiError> {
    ctx.require_catalog_manager()?;
    request.validate()?;

    let repo = QuestionRepository::new(state.pool.clone());
    let current = repo
        .find_by_id(ctx.org_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;

    let fields = request
        .merge_onto(&current)
        .map_err(ApiError::Validation)?;

    let question = repo
        .update(ctx.org_id, id, &fields)
        .await
        .map_err(title_conflict)?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;

    info!(
        organization_id = %ctx.org_id,
        question_id = %id,
        status = %question.status,
        user_id = %ctx.user_id,
        "Question updated"
    );

    Ok(Json(question))
}

/// Delete a question no template uses.
///
/// DELETE /api/v1/organizations/:org_id/questions/:id
pub async fn delete_question(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path((_, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    ctx.require_catalog_manager()?;

    let repo = QuestionRepository::new(state.pool.clone());
    if repo.find_by_id(ctx.org_id, id).await?.is_none() {
        return Err(ApiError::NotFound("Question not found".to_string()));
    }

    if repo.is_referenced(id).await? {
        return Err(ApiError::Conflict(
            "Question is used by a template; deactivate it instead".to_string(),
        ));
    }

    if !repo.delete(ctx.org_id, id).await? {
        return Err(ApiError::NotFound("Question not found".to_string()));
    }

    info!(
        organization_id = %ctx.org_id,
        question_id = %id,
        user_id = %ctx.user_id,
        "Question deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
