use std::collections::BTreeSet;
use std::sync::Arc;

use tenantry_core::{AppError, AppResult, TenantId, UserId};
use tenantry_domain::{MembershipPermissionOverride, OverrideEffect, PermissionId};
use tracing::{info, warn};

use crate::membership_ports::{MembershipRepository, OverrideRepository};
use crate::membership_service::membership_not_found;
use crate::permission_ports::PermissionRepository;


/// Outcome of writing an override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideWrite {
    /// Stored override.
    pub record: MembershipPermissionOverride,
    /// Membership version after the write, or before it when the bump failed.
    pub membership_version: i64,
    /// Whether the membership version was incremented.
    pub version_bumped: bool,
}

/// Outcome of removing an override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideRemoval {
    /// Removed override.
    pub removed: MembershipPermissionOverride,
    /// Membership version after the removal, or before it when the bump failed.
    pub membership_version: i64,
    /// Whether the membership version was incremented.
    pub version_bumped: bool,
}

/// Application service for membership permission overrides.
///
/// The override write and the version bump are two sequential store calls.
/// A failed bump after a successful write is logged and reported through
/// `version_bumped` instead of failing the call.
#[derive(Clone)]
pub struct OverrideService {
    repository: Arc<dyn OverrideRepository>,
    membership_repository: Arc<dyn MembershipRepository>,
    permission_repository: Arc<dyn PermissionRepository>,
}

impl OverrideService {
    /// Creates a new override service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn OverrideRepository>,
        membership_repository: Arc<dyn MembershipRepository>,
        permission_repository: Arc<dyn PermissionRepository>,
    ) -> Self {
        Self {
            repository,
            membership_repository,
            permission_repository,
        }
    }

    /// Lists overrides recorded for one membership.
    pub async fn list_overrides(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Vec<MembershipPermissionOverride>> {
        self.membership_repository
            .find_membership(tenant_id, user_id)
            .await?
            .ok_or_else(|| membership_not_found(tenant_id, user_id))?;

        self.repository.list_overrides(tenant_id, user_id).await
    }

    /// Records an `ALLOW` or `DENY` override, replacing any previous one.
    ///
    /// Each call bumps the membership version, including repeats of the
    /// same effect.
    pub async fn set_override(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        permission_id: &PermissionId,
        effect: OverrideEffect,
        reason: Option<String>,
    ) -> AppResult<OverrideWrite> {
        let known = self
            .permission_repository
            .find_existing_permission_ids(&BTreeSet::from([permission_id.clone()]))
            .await?;
        if !known.contains(permission_id) {
            return Err(AppError::Validation(format!(
                "invalid permission id '{permission_id}'"
            )));
        }

        let membership = self
            .membership_repository
            .find_membership(tenant_id, user_id)
            .await?
            .ok_or_else(|| membership_not_found(tenant_id, user_id))?;

        let reason = reason
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        let record = self
            .repository
            .upsert_override(tenant_id, user_id, permission_id, effect, reason)
            .await?;

        let (membership_version, version_bumped) = self
            .bump_version(tenant_id, user_id, membership.membership_version())
            .await;

        info!(
            tenant_id = %tenant_id,
            user_id = %user_id,
            permission_id = %permission_id,
            effect = effect.as_str(),
            membership_version,
            "permission override set"
        );

        Ok(OverrideWrite {
            record,
            membership_version,
            version_bumped,
        })
    }

    /// Deletes an override. Removing a missing override is not found.
    pub async fn remove_override(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        permission_id: &PermissionId,
    ) -> AppResult<OverrideRemoval> {
        let membership = self
            .membership_repository
            .find_membership(tenant_id, user_id)
            .await?
            .ok_or_else(|| membership_not_found(tenant_id, user_id))?;

        let removed = self
            .repository
            .delete_override(tenant_id, user_id, permission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "override for permission '{permission_id}' not found"
                ))
            })?;

        let (membership_version, version_bumped) = self
            .bump_version(tenant_id, user_id, membership.membership_version())
            .await;

        info!(
            tenant_id = %tenant_id,
            user_id = %user_id,
            permission_id = %permission_id,
            membership_version,
            "permission override removed"
        );

        Ok(OverrideRemoval {
            removed,
            membership_version,
            version_bumped,
        })
    }

    async fn bump_version(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        previous_version: i64,
    ) -> (i64, bool) {
        match self
            .membership_repository
            .increment_membership_version(tenant_id, user_id)
            .await
        {
            Ok(Some(membership)) => (membership.membership_version(), true),
            Ok(None) => {
                warn!(
                    tenant_id = %tenant_id,
                    user_id = %user_id,
                    "membership disappeared before version bump"
                );
                (previous_version, false)
            }
            Err(error) => {
                warn!(
                    tenant_id = %tenant_id,
                    user_id = %user_id,
                    error = %error,
                    "failed to bump membership version after override write"
                );
                (previous_version, false)
            }
        }
    }
}
