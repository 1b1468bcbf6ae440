//! User models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::organization::OrgRole;
use super::template::ModelType;

/// A registered user (without credentials).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// One of the current user's memberships.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MembershipSummary {
    pub organization_id: Uuid,
    pub organization_name: String,
    pub role: OrgRole,
    pub model_type: Option<ModelType>,
}

/// Response for `GET /users/me`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CurrentUserResponse {
    #[serde(flatten)]
    pub user: User,
    pub memberships: Vec<MembershipSummary>,
}
