//! Organization membership extractor for tenant routes.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use domain::models::{ModelType, OrgRole};
use persistence::repositories::OrganizationRepository;
use std::collections::HashMap;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// The caller's membership in the organization named by the `:org_id` path
/// segment. Rejects with 403 when the caller is not a member.
#[derive(Debug, Clone)]
pub struct OrgContext {
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub role: OrgRole,
    pub model_type: Option<ModelType>,
}

impl OrgContext {
    pub fn require_catalog_manager(&self) -> Result<(), ApiError> {
        if self.role.can_manage_catalog() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Only admins can change questions and templates".to_string(),
            ))
        }
    }

    pub fn require_team_manager(&self) -> Result<(), ApiError> {
        if self.role.can_manage_team() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Only admins can manage the team".to_string()))
        }
    }

    /// Submitter restriction for submission queries. `None` means every
    /// submission of the organization is visible.
    pub fn submission_owner_scope(&self) -> Option<Uuid> {
        if self.role.can_view_all_submissions() {
            None
        } else {
            Some(self.user_id)
        }
    }

    /// Business model used to filter visible templates. Admins see all.
    pub fn template_viewer(&self) -> Option<ModelType> {
        if self.role.can_manage_catalog() {
            None
        } else {
            self.model_type
        }
    }

    /// Whether the caller may delete a submission made by `submitted_by`.
    pub fn can_delete_submission(&self, submitted_by: Uuid) -> bool {
        self.role.can_view_all_submissions() || submitted_by == self.user_id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OrgContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = UserAuth::from_request_parts(parts, state).await?;

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound("Organization not found".to_string()))?;

        let org_id = params
            .get("org_id")
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or_else(|| ApiError::Validation("Invalid organization id".to_string()))?;

        let member = OrganizationRepository::new(state.pool.clone())
            .find_member(org_id, auth.user_id)
            .await?
            .ok_or_else(|| {
                ApiError::Forbidden("You are not a member of this organization".to_string())
            })?;

        Ok(OrgContext {
            org_id,
            user_id: auth.user_id,
            role: member.role,
            model_type: member.model_type,
        })
    }
}
