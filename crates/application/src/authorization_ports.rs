use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tenantry_core::{AppResult, TenantId, UserId};
use tenantry_domain::{PermissionId, Role, RoleId, TenantMembership};

/// Version vector an effective permission set was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionFingerprint {
    /// Membership version at computation time.
    pub membership_version: i64,
    /// Version of each assigned role that still exists.
    pub role_versions: BTreeMap<RoleId, i64>,
}

impl PermissionFingerprint {
    pub(crate) fn of(membership: &TenantMembership, roles: &[Role]) -> Self {
        Self {
            membership_version: membership.membership_version(),
            role_versions: roles
                .iter()
                .map(|role| (role.role_id().clone(), role.role_version()))
                .collect(),
        }
    }
}

/// Cached effective permission set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEffectivePermissions {
    /// Versions the entry is valid for.
    pub fingerprint: PermissionFingerprint,
    /// Allowed permission identifiers.
    pub allowed: BTreeSet<PermissionId>,
}

/// Cache port for resolved permission sets.
///
/// Entries are only served when their fingerprint equals the current one, so
/// implementations never need explicit invalidation.
#[async_trait]
pub trait EffectivePermissionCache: Send + Sync {
    /// Returns the entry stored for a membership.
    async fn get(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Option<CachedEffectivePermissions>>;

    /// Stores an entry, replacing any previous one.
    async fn put(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        entry: CachedEffectivePermissions,
    ) -> AppResult<()>;
}
