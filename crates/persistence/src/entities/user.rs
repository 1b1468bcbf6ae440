//! User authentication entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::member::{ModelTypeDb, OrgRoleDb};

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            display_name: entity.display_name,
            is_active: entity.is_active,
            created_at: entity.created_at,
            last_login_at: entity.last_login_at,
        }
    }
}

/// Database row mapping for the user_sessions table.
#[derive(Debug, Clone, FromRow)]
pub struct UserSessionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

/// One of a user's memberships joined with the organization name.
#[derive(Debug, Clone, FromRow)]
pub struct MembershipEntity {
    pub organization_id: Uuid,
    pub organization_name: String,
    pub role: OrgRoleDb,
    pub model_type: Option<ModelTypeDb>,
}

impl From<MembershipEntity> for domain::models::user::MembershipSummary {
    fn from(entity: MembershipEntity) -> Self {
        Self {
            organization_id: entity.organization_id,
            organization_name: entity.organization_name,
            role: entity.role.into(),
            model_type: entity.model_type.map(Into::into),
        }
    }
}
