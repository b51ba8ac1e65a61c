use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tenantry_application::OverrideRepository;
use tenantry_core::{AppError, AppResult, TenantId, UserId};
use tenantry_domain::{MembershipPermissionOverride, OverrideEffect, PermissionId};

#[derive(Debug, FromRow)]
struct OverrideRow {
    tenant_id: String,
    user_id: String,
    permission_id: String,
    effect: String,
    reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OverrideRow {
    fn into_override(self) -> AppResult<MembershipPermissionOverride> {
        MembershipPermissionOverride::from_stored(
            TenantId::new(self.tenant_id)?,
            UserId::new(self.user_id)?,
            self.permission_id,
            self.effect.as_str(),
            self.reason,
            self.created_at,
            self.updated_at,
        )
    }
}

/// PostgreSQL-backed membership override repository.
#[derive(Clone)]
pub struct PostgresOverrideRepository {
    pool: PgPool,
}

impl PostgresOverrideRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OverrideRepository for PostgresOverrideRepository {
    async fn upsert_override(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        permission_id: &PermissionId,
        effect: OverrideEffect,
        reason: Option<String>,
    ) -> AppResult<MembershipPermissionOverride> {
        sqlx::query_as::<_, OverrideRow>(
            r#"
            INSERT INTO membership_permission_overrides (
                tenant_id, user_id, permission_id, effect, reason
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (tenant_id, user_id, permission_id)
            DO UPDATE SET
                effect = EXCLUDED.effect,
                reason = EXCLUDED.reason,
                updated_at = now()
            RETURNING tenant_id, user_id, permission_id, effect, reason, created_at, updated_at
            "#,
        )
        .bind(tenant_id.as_str())
        .bind(user_id.as_str())
        .bind(permission_id.as_str())
        .bind(effect.as_str())
        .bind(reason)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save override: {error}")))?
        .into_override()
    }

    async fn delete_override(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        permission_id: &PermissionId,
    ) -> AppResult<Option<MembershipPermissionOverride>> {
        sqlx::query_as::<_, OverrideRow>(
            r#"
            DELETE FROM membership_permission_overrides
            WHERE tenant_id = $1 AND user_id = $2 AND permission_id = $3
            RETURNING tenant_id, user_id, permission_id, effect, reason, created_at, updated_at
            "#,
        )
        .bind(tenant_id.as_str())
        .bind(user_id.as_str())
        .bind(permission_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete override: {error}")))?
        .map(OverrideRow::into_override)
        .transpose()
    }

    async fn list_overrides(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Vec<MembershipPermissionOverride>> {
        let rows = sqlx::query_as::<_, OverrideRow>(
            r#"
            SELECT tenant_id, user_id, permission_id, effect, reason, created_at, updated_at
            FROM membership_permission_overrides
            WHERE tenant_id = $1 AND user_id = $2
            ORDER BY permission_id
            "#,
        )
        .bind(tenant_id.as_str())
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list overrides: {error}")))?;

        rows.into_iter().map(OverrideRow::into_override).collect()
    }
}
