use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tenantry_core::{AppError, AppResult, TenantId, UserId};
use tenantry_domain::{
    Decision, EffectivePermissions, MembershipStatus, PermissionId, RoleId, TenantMembership,
};
use tracing::{debug, warn};

use crate::authorization_ports::{
    CachedEffectivePermissions, EffectivePermissionCache, PermissionFingerprint,
};
use crate::membership_ports::{MembershipRepository, OverrideRepository};
use crate::membership_service::membership_not_found;
use crate::role_ports::RoleRepository;

#[cfg(test)]
mod tests;

/// Resolved permission set for one membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePermissionsView {
    /// Tenant scope.
    pub tenant_id: TenantId,
    /// Member.
    pub user_id: UserId,
    /// Lifecycle status. Resolution does not consult it.
    pub status: MembershipStatus,
    /// Membership version the set was computed from.
    pub membership_version: i64,
    /// Versions of the assigned roles that still resolve.
    pub role_versions: BTreeMap<RoleId, i64>,
    /// Allowed permissions.
    pub allowed: BTreeSet<PermissionId>,
    /// Whether the set was served from the cache.
    pub cached: bool,
}

impl EffectivePermissionsView {
    /// Returns the decision for one permission.
    #[must_use]
    pub fn decision(&self, permission_id: &PermissionId) -> Decision {
        if self.allowed.contains(permission_id) {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// Application service answering authorization questions for memberships.
#[derive(Clone)]
pub struct AuthorizationService {
    membership_repository: Arc<dyn MembershipRepository>,
    role_repository: Arc<dyn RoleRepository>,
    override_repository: Arc<dyn OverrideRepository>,
    cache: Option<Arc<dyn EffectivePermissionCache>>,
}

impl AuthorizationService {
    /// Creates an authorization service without caching.
    #[must_use]
    pub fn new(
        membership_repository: Arc<dyn MembershipRepository>,
        role_repository: Arc<dyn RoleRepository>,
        override_repository: Arc<dyn OverrideRepository>,
    ) -> Self {
        Self {
            membership_repository,
            role_repository,
            override_repository,
            cache: None,
        }
    }

    /// Enables version-keyed caching of resolved sets.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn EffectivePermissionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Resolves the effective permission set of a membership.
    pub async fn effective_permissions(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<EffectivePermissionsView> {
        let membership = self
            .membership_repository
            .find_membership(tenant_id, user_id)
            .await?
            .ok_or_else(|| membership_not_found(tenant_id, user_id))?;

        self.resolve(membership).await
    }

    /// Returns the decision for one permission. A missing membership is denied.
    pub async fn decide(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        permission_id: &PermissionId,
    ) -> AppResult<Decision> {
        let Some(membership) = self
            .membership_repository
            .find_membership(tenant_id, user_id)
            .await?
        else {
            return Ok(Decision::Deny);
        };

        Ok(self.resolve(membership).await?.decision(permission_id))
    }

    /// Ensures a member holds a permission.
    pub async fn require_permission(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        permission_id: &PermissionId,
    ) -> AppResult<()> {
        match self.decide(tenant_id, user_id, permission_id).await? {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(AppError::Forbidden(format!(
                "user '{user_id}' is missing permission '{permission_id}' in tenant '{tenant_id}'"
            ))),
        }
    }

    async fn resolve(&self, membership: TenantMembership) -> AppResult<EffectivePermissionsView> {
        let tenant_id = membership.tenant_id().clone();
        let user_id = membership.user_id().clone();

        let roles = self
            .role_repository
            .find_roles(&tenant_id, membership.roles())
            .await?;
        let fingerprint = PermissionFingerprint::of(&membership, &roles);

        if let Some(allowed) = self.cached(&tenant_id, &user_id, &fingerprint).await {
            return Ok(EffectivePermissionsView {
                tenant_id,
                user_id,
                status: membership.status(),
                membership_version: fingerprint.membership_version,
                role_versions: fingerprint.role_versions,
                allowed,
                cached: true,
            });
        }

        let overrides = self
            .override_repository
            .list_overrides(&tenant_id, &user_id)
            .await?;
        let allowed = EffectivePermissions::resolve(&membership, &roles, &overrides).into_allowed();

        if let Some(cache) = &self.cache {
            let entry = CachedEffectivePermissions {
                fingerprint: fingerprint.clone(),
                allowed: allowed.clone(),
            };
            if let Err(error) = cache.put(&tenant_id, &user_id, entry).await {
                warn!(
                    tenant_id = %tenant_id,
                    user_id = %user_id,
                    error = %error,
                    "failed to cache effective permissions"
                );
            }
        }

        Ok(EffectivePermissionsView {
            tenant_id,
            user_id,
            status: membership.status(),
            membership_version: fingerprint.membership_version,
            role_versions: fingerprint.role_versions,
            allowed,
            cached: false,
        })
    }

    async fn cached(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        fingerprint: &PermissionFingerprint,
    ) -> Option<BTreeSet<PermissionId>> {
        let cache = self.cache.as_ref()?;

        match cache.get(tenant_id, user_id).await {
            Ok(Some(entry)) if entry.fingerprint == *fingerprint => {
                debug!(
                    tenant_id = %tenant_id,
                    user_id = %user_id,
                    "effective permission cache hit"
                );
                Some(entry.allowed)
            }
            Ok(_) => {
                debug!(
                    tenant_id = %tenant_id,
                    user_id = %user_id,
                    "effective permission cache miss"
                );
                None
            }
            Err(error) => {
                warn!(
                    tenant_id = %tenant_id,
                    user_id = %user_id,
                    error = %error,
                    "effective permission cache read failed"
                );
                None
            }
        }
    }
}
