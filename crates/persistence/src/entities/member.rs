//! Organization membership entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{ModelType, OrgRole};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for org_role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "org_role", rename_all = "lowercase")]
pub enum OrgRoleDb {
    Owner,
    Admin,
    Member,
}

impl From<OrgRoleDb> for OrgRole {
    fn from(db: OrgRoleDb) -> Self {
        match db {
            OrgRoleDb::Owner => Self::Owner,
            OrgRoleDb::Admin => Self::Admin,
            OrgRoleDb::Member => Self::Member,
        }
    }
}

impl From<OrgRole> for OrgRoleDb {
    fn from(domain: OrgRole) -> Self {
        match domain {
            OrgRole::Owner => Self::Owner,
            OrgRole::Admin => Self::Admin,
            OrgRole::Member => Self::Member,
        }
    }
}

/// Database enum for model_type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "model_type", rename_all = "lowercase")]
pub enum ModelTypeDb {
    Credito,
    Imobiliaria,
    Seguro,
}

impl From<ModelTypeDb> for ModelType {
    fn from(db: ModelTypeDb) -> Self {
        match db {
            ModelTypeDb::Credito => Self::Credito,
            ModelTypeDb::Imobiliaria => Self::Imobiliaria,
            ModelTypeDb::Seguro => Self::Seguro,
        }
    }
}

impl From<ModelType> for ModelTypeDb {
    fn from(domain: ModelType) -> Self {
        match domain {
            ModelType::Credito => Self::Credito,
            ModelType::Imobiliaria => Self::Imobiliaria,
            ModelType::Seguro => Self::Seguro,
        }
    }
}

/// Membership row joined with the user profile.
#[derive(Debug, Clone, FromRow)]
pub struct MemberEntity {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: OrgRoleDb,
    pub model_type: Option<ModelTypeDb>,
    pub joined_at: DateTime<Utc>,
}

impl From<MemberEntity> for domain::models::Member {
    fn from(entity: MemberEntity) -> Self {
        Self {
            user_id: entity.user_id,
            email: entity.email,
            display_name: entity.display_name,
            role: entity.role.into(),
            model_type: entity.model_type.map(Into::into),
            joined_at: entity.joined_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion() {
        assert_eq!(OrgRole::from(OrgRoleDb::Owner), OrgRole::Owner);
        assert_eq!(OrgRoleDb::from(OrgRole::Member), OrgRoleDb::Member);
    }

    #[test]
    fn test_model_type_conversion() {
        assert_eq!(ModelType::from(ModelTypeDb::Imobiliaria), ModelType::Imobiliaria);
        assert_eq!(ModelTypeDb::from(ModelType::Seguro), ModelTypeDb::Seguro);
    }
}
