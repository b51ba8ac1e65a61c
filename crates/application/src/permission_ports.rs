use std::collections::BTreeSet;

use async_trait::async_trait;
use tenantry_core::AppResult;
use tenantry_domain::{Permission, PermissionId, PermissionKey, PermissionStatus};

/// Filter and window for one permission listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionListQuery {
    /// Optional status filter.
    pub status: Option<PermissionStatus>,
    /// Optional case-insensitive substring matched against key or description.
    pub text: Option<String>,
    /// Only rows strictly after this insertion position are returned.
    pub after_position: Option<i64>,
    /// Maximum rows to return, already including the one-row over-fetch.
    pub fetch_limit: usize,
}

/// Permission row together with its stable insertion position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionListEntry {
    /// Monotonic position assigned at creation, used as the sort key.
    pub position: i64,
    /// Stored permission.
    pub permission: Permission,
}

/// Repository port for the global permission registry.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Persists a new permission. Fails with a conflict when the key exists.
    async fn create_permission(&self, permission: Permission) -> AppResult<Permission>;

    /// Finds a permission by identifier.
    async fn find_permission(&self, permission_id: &PermissionId)
    -> AppResult<Option<Permission>>;

    /// Finds a permission by its normalized key.
    async fn find_permission_by_key(&self, key: &PermissionKey) -> AppResult<Option<Permission>>;

    /// Returns the subset of `permission_ids` that exist, whatever their status.
    async fn find_existing_permission_ids(
        &self,
        permission_ids: &BTreeSet<PermissionId>,
    ) -> AppResult<BTreeSet<PermissionId>>;

    /// Marks a permission deprecated. Returns `None` when it does not exist.
    async fn deprecate_permission(
        &self,
        permission_id: &PermissionId,
    ) -> AppResult<Option<Permission>>;

    /// Lists permissions ordered by ascending insertion position.
    async fn list_permissions(
        &self,
        query: PermissionListQuery,
    ) -> AppResult<Vec<PermissionListEntry>>;
}
