use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tenantry_application::MembershipRepository;
use tenantry_core::{AppError, AppResult, TenantId, UserId};
use tenantry_domain::{MembershipStatus, RoleId, SetMutation, TenantMembership};

use crate::id_strings;


#[derive(Debug, FromRow)]
struct MembershipRow {
    membership_id: String,
    tenant_id: String,
    user_id: String,
    roles: Vec<String>,
    status: String,
    expires_at: Option<DateTime<Utc>>,
    membership_version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MembershipRow {
    fn into_membership(self) -> AppResult<TenantMembership> {
        TenantMembership::from_stored(
            self.membership_id,
            TenantId::new(self.tenant_id)?,
            UserId::new(self.user_id)?,
            self.roles,
            self.status.as_str(),
            self.expires_at,
            self.membership_version,
            self.created_at,
            self.updated_at,
        )
    }
}

/// PostgreSQL-backed tenant membership repository.
#[derive(Clone)]
pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_optional(
        &self,
        query: sqlx::query::QueryAs<'_, sqlx::Postgres, MembershipRow, sqlx::postgres::PgArguments>,
        action: &str,
    ) -> AppResult<Option<TenantMembership>> {
        query
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to {action}: {error}")))?
            .map(MembershipRow::into_membership)
            .transpose()
    }
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn create_membership(
        &self,
        membership: TenantMembership,
    ) -> AppResult<TenantMembership> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            INSERT INTO tenant_memberships (
                membership_id, tenant_id, user_id, roles, status, expires_at,
                membership_version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING membership_id, tenant_id, user_id, roles, status, expires_at,
                membership_version, created_at, updated_at
            "#,
        )
        .bind(membership.membership_id().as_str())
        .bind(membership.tenant_id().as_str())
        .bind(membership.user_id().as_str())
        .bind(id_strings(membership.roles().iter().map(RoleId::as_str)))
        .bind(membership.status().as_str())
        .bind(membership.expires_at())
        .bind(membership.membership_version())
        .bind(membership.created_at())
        .bind(membership.updated_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(database_error) = &error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(format!(
                    "user '{}' already has a membership in tenant '{}'",
                    membership.user_id(),
                    membership.tenant_id()
                ));
            }

            AppError::Internal(format!("failed to create membership: {error}"))
        })?;

        row.into_membership()
    }

    async fn find_membership(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Option<TenantMembership>> {
        self.fetch_one_optional(
            sqlx::query_as::<_, MembershipRow>(
                r#"
                SELECT membership_id, tenant_id, user_id, roles, status, expires_at,
                    membership_version, created_at, updated_at
                FROM tenant_memberships
                WHERE tenant_id = $1 AND user_id = $2
                "#,
            )
            .bind(tenant_id.as_str())
            .bind(user_id.as_str()),
            "find membership",
        )
        .await
    }

    async fn update_membership_roles(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        mutation: &SetMutation<RoleId>,
    ) -> AppResult<Option<TenantMembership>> {
        self.fetch_one_optional(
            sqlx::query_as::<_, MembershipRow>(
                r#"
                UPDATE tenant_memberships
                SET roles = ARRAY(
                        SELECT DISTINCT value
                        FROM unnest(array_cat(roles, $3::TEXT[])) AS value
                        WHERE value <> ALL($4::TEXT[])
                        ORDER BY value
                    ),
                    membership_version = membership_version + 1,
                    updated_at = now()
                WHERE tenant_id = $1 AND user_id = $2
                RETURNING membership_id, tenant_id, user_id, roles, status, expires_at,
                    membership_version, created_at, updated_at
                "#,
            )
            .bind(tenant_id.as_str())
            .bind(user_id.as_str())
            .bind(id_strings(mutation.add().iter().map(RoleId::as_str)))
            .bind(id_strings(mutation.remove().iter().map(RoleId::as_str))),
            "update membership roles",
        )
        .await
    }

    async fn update_membership_status(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        status: MembershipStatus,
    ) -> AppResult<Option<TenantMembership>> {
        self.fetch_one_optional(
            sqlx::query_as::<_, MembershipRow>(
                r#"
                UPDATE tenant_memberships
                SET status = $3,
                    membership_version = membership_version + 1,
                    updated_at = now()
                WHERE tenant_id = $1 AND user_id = $2
                RETURNING membership_id, tenant_id, user_id, roles, status, expires_at,
                    membership_version, created_at, updated_at
                "#,
            )
            .bind(tenant_id.as_str())
            .bind(user_id.as_str())
            .bind(status.as_str()),
            "update membership status",
        )
        .await
    }

    async fn activate_invited_membership(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Option<TenantMembership>> {
        self.fetch_one_optional(
            sqlx::query_as::<_, MembershipRow>(
                r#"
                UPDATE tenant_memberships
                SET status = 'ACTIVE',
                    membership_version = membership_version + 1,
                    updated_at = now()
                WHERE tenant_id = $1 AND user_id = $2 AND status = 'INVITED'
                RETURNING membership_id, tenant_id, user_id, roles, status, expires_at,
                    membership_version, created_at, updated_at
                "#,
            )
            .bind(tenant_id.as_str())
            .bind(user_id.as_str()),
            "activate membership",
        )
        .await
    }

    async fn increment_membership_version(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Option<TenantMembership>> {
        self.fetch_one_optional(
            sqlx::query_as::<_, MembershipRow>(
                r#"
                UPDATE tenant_memberships
                SET membership_version = membership_version + 1,
                    updated_at = now()
                WHERE tenant_id = $1 AND user_id = $2
                RETURNING membership_id, tenant_id, user_id, roles, status, expires_at,
                    membership_version, created_at, updated_at
                "#,
            )
            .bind(tenant_id.as_str())
            .bind(user_id.as_str()),
            "increment membership version",
        )
        .await
    }
}
