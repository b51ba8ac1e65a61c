use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tenantry_application::{PermissionListEntry, PermissionListQuery, PermissionRepository};
use tenantry_core::{AppError, AppResult};
use tenantry_domain::{Permission, PermissionId, PermissionKey};

use crate::fetch_limit;


#[derive(Debug, FromRow)]
struct PermissionRow {
    seq: i64,
    permission_id: String,
    permission_key: String,
    description: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PermissionRow {
    fn into_entry(self) -> AppResult<PermissionListEntry> {
        Ok(PermissionListEntry {
            position: self.seq,
            permission: Permission::from_stored(
                self.permission_id,
                self.permission_key,
                self.description,
                self.status.as_str(),
                self.created_at,
                self.updated_at,
            )?,
        })
    }

    fn into_permission(self) -> AppResult<Permission> {
        self.into_entry().map(|entry| entry.permission)
    }
}

/// PostgreSQL-backed permission registry.
#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for PostgresPermissionRepository {
    async fn create_permission(&self, permission: Permission) -> AppResult<Permission> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            INSERT INTO permissions (
                permission_id, permission_key, description, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING
                seq, permission_id, permission_key, description, status, created_at, updated_at
            "#,
        )
        .bind(permission.permission_id().as_str())
        .bind(permission.key().as_str())
        .bind(permission.description())
        .bind(permission.status().as_str())
        .bind(permission.created_at())
        .bind(permission.updated_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(database_error) = &error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(format!(
                    "permission '{}' already exists",
                    permission.key().as_str()
                ));
            }

            AppError::Internal(format!("failed to create permission: {error}"))
        })?;

        row.into_permission()
    }

    async fn find_permission(
        &self,
        permission_id: &PermissionId,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT seq, permission_id, permission_key, description, status, created_at, updated_at
            FROM permissions
            WHERE permission_id = $1
            "#,
        )
        .bind(permission_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find permission: {error}")))?
        .map(PermissionRow::into_permission)
        .transpose()
    }

    async fn find_permission_by_key(&self, key: &PermissionKey) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT seq, permission_id, permission_key, description, status, created_at, updated_at
            FROM permissions
            WHERE permission_key = $1
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find permission by key: {error}"))
        })?
        .map(PermissionRow::into_permission)
        .transpose()
    }

    async fn find_existing_permission_ids(
        &self,
        permission_ids: &BTreeSet<PermissionId>,
    ) -> AppResult<BTreeSet<PermissionId>> {
        let requested: Vec<String> = permission_ids
            .iter()
            .map(|permission_id| permission_id.as_str().to_owned())
            .collect();

        let found = sqlx::query_scalar::<_, String>(
            r#"
            SELECT permission_id
            FROM permissions
            WHERE permission_id = ANY($1)
            "#,
        )
        .bind(requested)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to resolve permission ids: {error}"))
        })?;

        found.into_iter().map(PermissionId::new).collect()
    }

    async fn deprecate_permission(
        &self,
        permission_id: &PermissionId,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            UPDATE permissions
            SET status = 'DEPRECATED', updated_at = now()
            WHERE permission_id = $1
            RETURNING
                seq, permission_id, permission_key, description, status, created_at, updated_at
            "#,
        )
        .bind(permission_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to deprecate permission: {error}")))?
        .map(PermissionRow::into_permission)
        .transpose()
    }

    async fn list_permissions(
        &self,
        query: PermissionListQuery,
    ) -> AppResult<Vec<PermissionListEntry>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT seq, permission_id, permission_key, description, status, created_at, updated_at
            FROM permissions
            WHERE ($1::BIGINT IS NULL OR seq > $1)
              AND ($2::TEXT IS NULL OR status = $2)
              AND (
                $3::TEXT IS NULL
                OR strpos(lower(permission_key), lower($3)) > 0
                OR strpos(lower(description), lower($3)) > 0
              )
            ORDER BY seq ASC
            LIMIT $4
            "#,
        )
        .bind(query.after_position)
        .bind(query.status.map(|status| status.as_str()))
        .bind(query.text)
        .bind(fetch_limit(query.fetch_limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        rows.into_iter().map(PermissionRow::into_entry).collect()
    }
}
