use std::collections::HashMap;

use tenantry_application::PermissionListEntry;
use tenantry_core::{TenantId, UserId};
use tenantry_domain::{MembershipPermissionOverride, PermissionId, Role, RoleId, TenantMembership};
use tokio::sync::RwLock;

mod memberships;
mod overrides;
mod permissions;
mod roles;


#[derive(Debug, Default)]
struct PermissionTable {
    next_position: i64,
    rows: Vec<PermissionListEntry>,
}

type MembershipKey = (TenantId, UserId);
type OverrideKey = (TenantId, UserId, PermissionId);

/// In-memory implementation of every RBAC repository port.
///
/// Each write holds the table's write lock for the whole read-modify-write,
/// which makes set mutations and version bumps atomic per record.
#[derive(Debug, Default)]
pub struct InMemoryRbacRepository {
    permissions: RwLock<PermissionTable>,
    roles: RwLock<HashMap<(TenantId, RoleId), Role>>,
    memberships: RwLock<HashMap<MembershipKey, TenantMembership>>,
    overrides: RwLock<HashMap<OverrideKey, MembershipPermissionOverride>>,
}

impl InMemoryRbacRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
