//! Current user routes.

use axum::{extract::State, Json};
use domain::models::user::CurrentUserResponse;
use persistence::repositories::UserRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Profile and memberships of the authenticated user.
///
/// GET /api/v1/users/me
pub async fn get_current_user(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<CurrentUserResponse>, ApiError> {
    let repo = UserRepository::new(state.pool.clone());

    let user = repo
        .find_by_id(user_auth.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    let memberships = repo.list_memberships(user.id).await?;

    Ok(Json(CurrentUserResponse {
        user: user.into(),
        memberships: memberships.into_iter().map(Into::into).collect(),
    }))
}
