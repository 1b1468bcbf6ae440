//! Organization and membership repository.

use domain::models::organization::OrganizationSummary;
use domain::models::{Member, ModelType, OrgRole, Organization};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    MemberEntity, ModelTypeDb, OrgRoleDb, OrganizationEntity, OrganizationSummaryEntity,
};
use crate::metrics::QueryTimer;

const MEMBER_COLUMNS: &str = r#"
    m.user_id, u.email, u.display_name, m.role, m.model_type, m.joined_at
"#;

/// Repository for organizations and their members.
#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check if slug is already taken.
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("organization_slug_exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM organizations WHERE slug = $1)",
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create an organization with `owner_id` as its first owner.
    pub async fn create_with_owner(
        &self,
        name: &str,
        slug: &str,
        owner_id: Uuid,
    ) -> Result<Organization, sqlx::Error> {
        let timer = QueryTimer::new("create_organization");
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, OrganizationEntity>(
            r#"
            INSERT INTO organizations (name, slug, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug, created_by, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(slug)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO organization_members (organization_id, user_id, role)
            VALUES ($1, $2, 'owner')
            "#,
        )
        .bind(entity.id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();

        Ok(entity.into())
    }

    /// Find organization by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, sqlx::Error> {
        let timer = QueryTimer::new("find_organization_by_id");
        let entity = sqlx::query_as::<_, OrganizationEntity>(
            r#"
            SELECT id, name, slug, created_by, created_at, updated_at
            FROM organizations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();

        Ok(entity.map(Into::into))
    }

    /// List the organizations a user belongs to.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<OrganizationSummary>, sqlx::Error> {
        let timer = QueryTimer::new("list_organizations_for_user");
        let entities = sqlx::query_as::<_, OrganizationSummaryEntity>(
            r#"
            SELECT o.id, o.name, o.slug,
                   (SELECT COUNT(*) FROM organization_members c WHERE c.organization_id = o.id) AS member_count,
                   m.role, m.joined_at
            FROM organizations o
            JOIN organization_members m ON m.organization_id = o.id
            WHERE m.user_id = $1
            ORDER BY o.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Find a user's membership in an organization.
    pub async fn find_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Member>, sqlx::Error> {
        let timer = QueryTimer::new("find_organization_member");
        let query = format!(
            r#"
            SELECT {MEMBER_COLUMNS}
            FROM organization_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.organization_id = $1 AND m.user_id = $2
            "#
        );
        let entity = sqlx::query_as::<_, MemberEntity>(&query)
            .bind(organization_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        timer.record();

        Ok(entity.map(Into::into))
    }

    /// List an organization's members, owners first.
    pub async fn list_members(&self, organization_id: Uuid) -> Result<Vec<Member>, sqlx::Error> {
        let timer = QueryTimer::new("list_organization_members");
        let query = format!(
            r#"
            SELECT {MEMBER_COLUMNS}
            FROM organization_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.organization_id = $1
            ORDER BY m.role, LOWER(u.display_name)
            "#
        );
        let entities = sqlx::query_as::<_, MemberEntity>(&query)
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?;
        timer.record();

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Count members of an organization.
    pub async fn count_members(&self, organization_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_organization_members");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM organization_members WHERE organization_id = $1",
        )
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count owners of an organization.
    pub async fn count_owners(&self, organization_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_organization_owners");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM organization_members
            WHERE organization_id = $1 AND role = 'owner'
            "#,
        )
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Add a user to an organization.
    pub async fn add_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        role: OrgRole,
        model_type: Option<ModelType>,
    ) -> Result<Member, sqlx::Error> {
        let timer = QueryTimer::new("add_organization_member");
        sqlx::query(
            r#"
            INSERT INTO organization_members (organization_id, user_id, role, model_type)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(OrgRoleDb::from(role))
        .bind(model_type.map(ModelTypeDb::from))
        .execute(&self.pool)
        .await?;
        timer.record();

        self.find_member(organization_id, user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Set a member's role and business model.
    pub async fn update_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        role: OrgRole,
        model_type: Option<ModelType>,
    ) -> Result<Option<Member>, sqlx::Error> {
        let timer = QueryTimer::new("update_organization_member");
        let result = sqlx::query(
            r#"
            UPDATE organization_members
            SET role = $3, model_type = $4
            WHERE organization_id = $1 AND user_id = $2
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(OrgRoleDb::from(role))
        .bind(model_type.map(ModelTypeDb::from))
        .execute(&self.pool)
        .await?;
        timer.record();

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_member(organization_id, user_id).await
    }

    /// Remove a member from an organization.
    pub async fn remove_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("remove_organization_member");
        let result = sqlx::query(
            "DELETE FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
