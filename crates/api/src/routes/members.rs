//! Team management routes.
//!
//! Admins and owners manage the team. Only owners grant, change or remove the
//! owner role, and an organization always keeps at least one owner.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::organization::{
    ensure_owner_remains, AddMemberRequest, ListMembersResponse, UpdateMemberRequest,
};
use domain::models::{Member, OrgRole};
use persistence::repositories::{OrganizationRepository, UserRepository};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{JsonBody, OrgContext};

fn require_owner_for(ctx: &OrgContext, roles: &[OrgRole]) -> Result<(), ApiError> {
    if roles.contains(&OrgRole::Owner) && ctx.role != OrgRole::Owner {
        return Err(ApiError::Forbidden(
            "Only owners can grant or revoke the owner role".to_string(),
        ));
    }
    Ok(())
}

async fn find_target(
    repo: &OrganizationRepository,
    org_id: Uuid,
    user_id: Uuid,
) -> Result<Member, ApiError> {
    repo.find_member(org_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))
}

/// List the organization's members.
///
/// GET /api/v1/organizations/:org_id/members
pub async fn list_members(
    State(state): State<AppState>,
    ctx: OrgContext,
) -> Result<Json<ListMembersResponse>, ApiError> {
    ctx.require_team_manager()?;

    let data = OrganizationRepository::new(state.pool.clone())
        .list_members(ctx.org_id)
        .await?;

    Ok(Json(ListMembersResponse {
        count: data.len(),
        data,
    }))
}

/// Add an existing user to the team by email.
///
/// POST /api/v1/organizations/:org_id/members
pub async fn add_member(
    State(state): State<AppState>,
    ctx: OrgContext,
    JsonBody(request): JsonBody<AddMemberRequest>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    ctx.require_team_manager()?;
    request.validate()?;

    let role = request.role.unwrap_or(OrgRole::Member);
    require_owner_for(&ctx, &[role])?;

    let user = UserRepository::new(state.pool.clone())
        .find_by_email(&request.email)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::NotFound("No active user with this email".to_string()))?;

    let repo = OrganizationRepository::new(state.pool.clone());
    if repo.find_member(ctx.org_id, user.id).await?.is_some() {
        return Err(ApiError::Conflict(
            "User is already a member of this organization".to_string(),
        ));
    }

    let member = repo
        .add_member(ctx.org_id, user.id, role, request.model_type)
        .await?;

    info!(
        organization_id = %ctx.org_id,
        member_id = %member.user_id,
        role = %member.role,
        added_by = %ctx.user_id,
        "Member added"
    );

    Ok((StatusCode::CREATED, Json(member)))
}

/// Change a member's role or business model.
///
/// PATCH /api/v1/organizations/:org_id/members/:user_id
pub async fn update_member(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path((_, user_id)): Path<(Uuid, Uuid)>,
    JsonBody(request): JsonBody<UpdateMemberRequest>,
) -> Result<Json<Member>, ApiError> {
    ctx.require_team_manager()?;

    let repo = OrganizationRepository::new(state.pool.clone());
    let target = find_target(&repo, ctx.org_id, user_id).await?;

    let next_role = request.role.unwrap_or(target.role);
    let model_type = request.model_type.unwrap_or(target.model_type);

    if next_role != target.role {
        require_owner_for(&ctx, &[target.role, next_role])?;
        let owners = repo.count_owners(ctx.org_id).await?;
        ensure_owner_remains(owners, target.role, Some(next_role)).map_err(ApiError::Conflict)?;
    }

    let member = repo
        .update_member(ctx.org_id, user_id, next_role, model_type)
        .await?
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    info!(
        organization_id = %ctx.org_id,
        member_id = %user_id,
        role = %member.role,
        model_type = ?member.model_type,
        updated_by = %ctx.user_id,
        "Member updated"
    );

    Ok(Json(member))
}

/// Remove a member. Members may also remove themselves.
///
/// DELETE /api/v1/organizations/:org_id/members/:user_id
pub async fn remove_member(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path((_, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    if user_id != ctx.user_id {
        ctx.require_team_manager()?;
    }

    let repo = OrganizationRepository::new(state.pool.clone());
    let target = find_target(&repo, ctx.org_id, user_id).await?;

    if user_id != ctx.user_id {
        require_owner_for(&ctx, &[target.role])?;
    }
    let owners = repo.count_owners(ctx.org_id).await?;
    ensure_owner_remains(owners, target.role, None).map_err(ApiError::Conflict)?;

    if !repo.remove_member(ctx.org_id, user_id).await? {
        return Err(ApiError::NotFound("Member not found".to_string()));
    }

    info!(
        organization_id = %ctx.org_id,
        member_id = %user_id,
        removed_by = %ctx.user_id,
        "Member removed"
    );

    Ok(StatusCode::NO_CONTENT)
}
