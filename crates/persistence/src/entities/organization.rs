//! Organization entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::member::OrgRoleDb;

/// Database row mapping for the organizations table.
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationEntity {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrganizationEntity> for domain::models::Organization {
    fn from(entity: OrganizationEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            slug: entity.slug,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Organization with the caller's membership, for listings.
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationSummaryEntity {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub member_count: i64,
    pub role: OrgRoleDb,
    pub joined_at: DateTime<Utc>,
}

impl From<OrganizationSummaryEntity> for domain::models::organization::OrganizationSummary {
    fn from(entity: OrganizationSummaryEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            slug: entity.slug,
            member_count: entity.member_count,
            your_role: entity.role.into(),
            joined_at: entity.joined_at,
        }
    }
}
