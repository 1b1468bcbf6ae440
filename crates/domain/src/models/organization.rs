//! Organization (tenant) and team membership models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::deserialize_some;
use super::template::ModelType;

/// Role within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgRole {
    Owner,
    Admin,
    Member,
}

impl OrgRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgRole::Owner => "owner",
            OrgRole::Admin => "admin",
            OrgRole::Member => "member",
        }
    }

    /// Can create and edit questions and templates.
    pub fn can_manage_catalog(&self) -> bool {
        matches!(self, OrgRole::Owner | OrgRole::Admin)
    }

    /// Can add, update and remove members.
    pub fn can_manage_team(&self) -> bool {
        matches!(self, OrgRole::Owner | OrgRole::Admin)
    }

    /// Sees every submission of the organization, not just their own.
    pub fn can_view_all_submissions(&self) -> bool {
        matches!(self, OrgRole::Owner | OrgRole::Admin)
    }
}

impl FromStr for OrgRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(OrgRole::Owner),
            "admin" => Ok(OrgRole::Admin),
            "member" => Ok(OrgRole::Member),
            _ => Err(format!("Invalid organization role: {}", s)),
        }
    }
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's membership in an organization, joined with the user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Member {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: OrgRole,
    pub model_type: Option<ModelType>,
    pub joined_at: DateTime<Utc>,
}

/// Organization listing entry for the current user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OrganizationSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub member_count: i64,
    pub your_role: OrgRole,
    pub joined_at: DateTime<Utc>,
}

/// Response for organization listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListOrganizationsResponse {
    pub data: Vec<OrganizationSummary>,
    pub count: usize,
}

/// Response for organization detail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OrganizationDetail {
    #[serde(flatten)]
    pub organization: Organization,
    pub member_count: i64,
    pub your_role: OrgRole,
    pub your_model_type: Option<ModelType>,
}

/// Request payload for creating an organization.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,
}

/// Request payload for adding an existing user to the team.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AddMemberRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    /// Defaults to `member`.
    pub role: Option<OrgRole>,

    pub model_type: Option<ModelType>,
}

/// Request payload for changing a member's role or business model.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateMemberRequest {
    pub role: Option<OrgRole>,

    /// Absent keeps the current value; `null` clears it.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub model_type: Option<Option<ModelType>>,
}

/// Response for member listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListMembersResponse {
    pub data: Vec<Member>,
    pub count: usize,
}

/// Checks that a role change or removal leaves the organization with an owner.
///
/// `owner_count` is the number of owners before the change, `current` the
/// target's role and `next` the role after the change (`None` for removal).
pub fn ensure_owner_remains(
    owner_count: i64,
    current: OrgRole,
    next: Option<OrgRole>,
) -> Result<(), String> {
    let loses_owner = current == OrgRole::Owner && next != Some(OrgRole::Owner);
    if loses_owner && owner_count <= 1 {
        return Err("An organization must keep at least one owner".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(OrgRole::Owner.can_manage_catalog());
        assert!(OrgRole::Admin.can_manage_team());
        assert!(!OrgRole::Member.can_manage_catalog());
        assert!(!OrgRole::Member.can_manage_team());
        assert!(!OrgRole::Member.can_view_all_submissions());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("Admin".parse::<OrgRole>().unwrap(), OrgRole::Admin);
        assert!("viewer".parse::<OrgRole>().is_err());
    }

    #[test]
    fn test_update_member_distinguishes_null_from_absent() {
        let absent: UpdateMemberRequest = serde_json::from_str(r#"{"role":"admin"}"#).unwrap();
        assert_eq!(absent.role, Some(OrgRole::Admin));
        assert_eq!(absent.model_type, None);

        let cleared: UpdateMemberRequest = serde_json::from_str(r#"{"model_type":null}"#).unwrap();
        assert_eq!(cleared.model_type, Some(None));

        let set: UpdateMemberRequest =
            serde_json::from_str(r#"{"model_type":"seguro"}"#).unwrap();
        assert_eq!(set.model_type, Some(Some(ModelType::Seguro)));
    }

    #[test]
    fn test_ensure_owner_remains() {
        assert!(ensure_owner_remains(1, OrgRole::Owner, None).is_err());
        assert!(ensure_owner_remains(1, OrgRole::Owner, Some(OrgRole::Admin)).is_err());
        assert!(ensure_owner_remains(1, OrgRole::Owner, Some(OrgRole::Owner)).is_ok());
        assert!(ensure_owner_remains(2, OrgRole::Owner, None).is_ok());
        assert!(ensure_owner_remains(1, OrgRole::Admin, None).is_ok());
    }

    #[test]
    fn test_add_member_validation() {
        let request = AddMemberRequest {
            email: "not-an-email".to_string(),
            role: None,
            model_type: None,
        };
        assert!(request.validate().is_err());
    }
}
