use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tenantry_application::{RoleListQuery, RoleRepository};
use tenantry_core::{AppError, AppResult, TenantId};
use tenantry_domain::{PermissionId, Role, RoleId, SetMutation};

use crate::{fetch_limit, id_strings};


#[derive(Debug, FromRow)]
struct RoleRow {
    role_id: String,
    tenant_id: String,
    name: String,
    status: String,
    permissions: Vec<String>,
    role_version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRow {
    fn into_role(self) -> AppResult<Role> {
        Role::from_stored(
            self.role_id,
            TenantId::new(self.tenant_id)?,
            self.name,
            self.status.as_str(),
            self.permissions,
            self.role_version,
            self.created_at,
            self.updated_at,
        )
    }
}

/// PostgreSQL-backed tenant role repository.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn create_role(&self, role: Role) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO rbac_roles (
                role_id, tenant_id, name, status, permissions, role_version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING
                role_id, tenant_id, name, status, permissions, role_version, created_at, updated_at
            "#,
        )
        .bind(role.role_id().as_str())
        .bind(role.tenant_id().as_str())
        .bind(role.name().as_str())
        .bind(role.status().as_str())
        .bind(id_strings(role.permissions().iter().map(PermissionId::as_str)))
        .bind(role.role_version())
        .bind(role.created_at())
        .bind(role.updated_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_role_conflict(error, role.name().as_str()))?;

        row.into_role()
    }

    async fn update_role_permissions(
        &self,
        tenant_id: &TenantId,
        role_id: &RoleId,
        mutation: &SetMutation<PermissionId>,
    ) -> AppResult<Option<Role>> {
        // One statement: the row lock serializes concurrent mutations and the
        // SET expression is re-evaluated against the latest row.
        sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE rbac_roles
            SET permissions = ARRAY(
                    SELECT DISTINCT value
                    FROM unnest(array_cat(permissions, $3::TEXT[])) AS value
                    WHERE value <> ALL($4::TEXT[])
                    ORDER BY value
                ),
                role_version = role_version + 1,
                updated_at = now()
            WHERE tenant_id = $1 AND role_id = $2
            RETURNING
                role_id, tenant_id, name, status, permissions, role_version, created_at, updated_at
            "#,
        )
        .bind(tenant_id.as_str())
        .bind(role_id.as_str())
        .bind(id_strings(mutation.add().iter().map(PermissionId::as_str)))
        .bind(id_strings(mutation.remove().iter().map(PermissionId::as_str)))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to update role permissions: {error}"))
        })?
        .map(RoleRow::into_role)
        .transpose()
    }

    async fn list_roles(&self, tenant_id: &TenantId, query: RoleListQuery) -> AppResult<Vec<Role>> {
        let (after_created_at, after_role_id) = match query.after {
            Some(cursor) => (Some(cursor.created_at), Some(cursor.role_id)),
            None => (None, None),
        };

        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                role_id, tenant_id, name, status, permissions, role_version, created_at, updated_at
            FROM rbac_roles
            WHERE tenant_id = $1
              AND ($2::TIMESTAMPTZ IS NULL OR (created_at, role_id) > ($2, $3::TEXT))
            ORDER BY created_at ASC, role_id ASC
            LIMIT $4
            "#,
        )
        .bind(tenant_id.as_str())
        .bind(after_created_at)
        .bind(after_role_id)
        .bind(fetch_limit(query.fetch_limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        rows.into_iter().map(RoleRow::into_role).collect()
    }

    async fn find_roles(
        &self,
        tenant_id: &TenantId,
        role_ids: &BTreeSet<RoleId>,
    ) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                role_id, tenant_id, name, status, permissions, role_version, created_at, updated_at
            FROM rbac_roles
            WHERE tenant_id = $1 AND role_id = ANY($2)
            ORDER BY role_id
            "#,
        )
        .bind(tenant_id.as_str())
        .bind(id_strings(role_ids.iter().map(RoleId::as_str)))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find roles: {error}")))?;

        rows.into_iter().map(RoleRow::into_role).collect()
    }
}

fn map_role_conflict(error: sqlx::Error, role_name: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("role '{role_name}' already exists"));
    }

    AppError::Internal(format!("failed to create role: {error}"))
}
