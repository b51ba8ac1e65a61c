use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tenantry_core::{AppResult, TenantId};
use tenantry_domain::{PermissionId, Role, RoleId, SetMutation};

/// Sort key of the last role on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCursor {
    /// Creation timestamp of the last returned role.
    pub created_at: DateTime<Utc>,
    /// Identifier of the last returned role, breaking timestamp ties.
    pub role_id: String,
}

impl RoleCursor {
    pub(crate) fn of(role: &Role) -> Self {
        Self {
            created_at: role.created_at(),
            role_id: role.role_id().as_str().to_owned(),
        }
    }
}

/// Window for one tenant role listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleListQuery {
    /// Only roles strictly after this `(created_at, role_id)` key are returned.
    pub after: Option<RoleCursor>,
    /// Maximum rows to return, already including the one-row over-fetch.
    pub fetch_limit: usize,
}

/// Repository port for tenant roles.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Persists a new role. Fails with a conflict when the tenant already has the name.
    async fn create_role(&self, role: Role) -> AppResult<Role>;

    /// Applies an add/remove mutation and increments the role version in one
    /// atomic step. Returns `None` when the role does not exist in the tenant.
    async fn update_role_permissions(
        &self,
        tenant_id: &TenantId,
        role_id: &RoleId,
        mutation: &SetMutation<PermissionId>,
    ) -> AppResult<Option<Role>>;

    /// Lists tenant roles ordered by `(created_at, role_id)` ascending.
    async fn list_roles(&self, tenant_id: &TenantId, query: RoleListQuery)
    -> AppResult<Vec<Role>>;

    /// Returns the roles of `tenant_id` among `role_ids`. Missing ids are skipped.
    async fn find_roles(
        &self,
        tenant_id: &TenantId,
        role_ids: &BTreeSet<RoleId>,
    ) -> AppResult<Vec<Role>>;
}
