//! Organization routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::organization::{
    CreateOrganizationRequest, ListOrganizationsResponse, OrganizationDetail,
};
use domain::models::OrgRole;
use persistence::repositories::OrganizationRepository;
use shared::text::slugify;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{JsonBody, OrgContext, UserAuth};

/// Suffixed slugs tried before giving up.
const MAX_SLUG_ATTEMPTS: u32 = 50;

/// Finds a free slug derived from the organization name.
async fn unique_slug(repo: &OrganizationRepository, name: &str) -> Result<String, ApiError> {
    let base = match slugify(name) {
        s if s.is_empty() => "organizacao".to_string(),
        s => s,
    };

    if !repo.slug_exists(&base).await? {
        return Ok(base);
    }
    for n in 2..=MAX_SLUG_ATTEMPTS {
        let candidate = format!("{}-{}", base, n);
        if !repo.slug_exists(&candidate).await? {
            return Ok(candidate);
        }
    }

    Err(ApiError::Conflict(
        "Too many organizations with this name".to_string(),
    ))
}

/// Create an organization. The creator becomes its owner.
///
/// POST /api/v1/organizations
pub async fn create_organization(
    State(state): State<AppState>,
    user_auth: UserAuth,
    JsonBody(request): JsonBody<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<OrganizationDetail>), ApiError> {
    request.validate()?;

    let repo = OrganizationRepository::new(state.pool.clone());
    let name = request.name.trim();
    let slug = unique_slug(&repo, name).await?;

    let organization = repo
        .create_with_owner(name, &slug, user_auth.user_id)
        .await?;

    info!(
        organization_id = %organization.id,
        slug = %organization.slug,
        user_id = %user_auth.user_id,
        "Organization created"
    );

    Ok((
        StatusCode::CREATED,
        Json(OrganizationDetail {
            organization,
            member_count: 1,
            your_role: OrgRole::Owner,
            your_model_type: None,
        }),
    ))
}

/// List the organizations the current user belongs to.
///
/// GET /api/v1/organizations
pub async fn list_organizations(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<ListOrganizationsResponse>, ApiError> {
    let data = OrganizationRepository::new(state.pool.clone())
        .list_for_user(user_auth.user_id)
        .await?;

    Ok(Json(ListOrganizationsResponse {
        count: data.len(),
        data,
    }))
}

/// Organization detail with the caller's membership.
///
/// GET /api/v1/organizations/:org_id
pub async fn get_organization(
    State(state): State<AppState>,
    ctx: OrgContext,
) -> Result<Json<OrganizationDetail>, ApiError> {
    let repo = OrganizationRepository::new(state.pool.clone());

    let organization = repo
        .find_by_id(ctx.org_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Organization not found".to_string()))?;
    let member_count = repo.count_members(ctx.org_id).await?;

    Ok(Json(OrganizationDetail {
        organization,
        member_count,
        your_role: ctx.role,
        your_model_type: ctx.model_type,
    }))
}
