//! Effective permission resolution.
//!
//! The decision for one `(tenant, user, permission)` triple is a closed,
//! deny-dominant precedence:
//!
//! 1. a `DENY` override denies, whatever else applies;
//! 2. otherwise an `ALLOW` override allows;
//! 3. otherwise the permission is allowed when an assigned role grants it;
//! 4. otherwise it is denied.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    MembershipPermissionOverride, OverrideEffect, PermissionId, Role, TenantMembership,
};

/// Final authorization outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Permission is granted.
    Allow,
    /// Permission is withheld.
    Deny,
}

impl Decision {
    /// Returns a stable transport value for this decision.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Deny => "DENY",
        }
    }

    /// Returns whether the decision grants access.
    #[must_use]
    pub fn is_allowed(self) -> bool {
        self == Self::Allow
    }
}

/// Applies the precedence rule to one permission.
///
/// `overrides` holds the effects recorded for this permission; storage keeps at
/// most one, but any number is handled.
pub fn decide(role_grants: bool, overrides: impl IntoIterator<Item = OverrideEffect>) -> Decision {
    let mut allow_override = false;
    for effect in overrides {
        match effect {
            OverrideEffect::Deny => return Decision::Deny,
            OverrideEffect::Allow => allow_override = true,
        }
    }

    if allow_override || role_grants {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Effective permission set of one membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePermissions {
    allowed: BTreeSet<PermissionId>,
}

impl EffectivePermissions {
    /// Resolves the allowed permission set for a membership.
    ///
    /// Roles that the membership no longer references, or that belong to
    /// another tenant, contribute nothing. Overrides for another membership
    /// are ignored.
    #[must_use]
    pub fn resolve(
        membership: &TenantMembership,
        roles: &[Role],
        overrides: &[MembershipPermissionOverride],
    ) -> Self {
        let role_granted: BTreeSet<&PermissionId> = roles
            .iter()
            .filter(|role| {
                role.tenant_id() == membership.tenant_id()
                    && membership.roles().contains(role.role_id())
            })
            .flat_map(|role| role.permissions().iter())
            .collect();

        let overrides: Vec<&MembershipPermissionOverride> = overrides
            .iter()
            .filter(|value| {
                value.tenant_id() == membership.tenant_id()
                    && value.user_id() == membership.user_id()
            })
            .collect();

        let candidates: BTreeSet<&PermissionId> = role_granted
            .iter()
            .copied()
            .chain(overrides.iter().map(|value| value.permission_id()))
            .collect();

        let allowed = candidates
            .into_iter()
            .filter(|permission_id| {
                decide(
                    role_granted.contains(permission_id),
                    overrides
                        .iter()
                        .filter(|value| value.permission_id() == *permission_id)
                        .map(|value| value.effect()),
                )
                .is_allowed()
            })
            .cloned()
            .collect();

        Self { allowed }
    }

    /// Returns the decision for one permission.
    #[must_use]
    pub fn decision(&self, permission_id: &PermissionId) -> Decision {
        if self.allowed.contains(permission_id) {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }

    /// Returns every allowed permission.
    #[must_use]
    pub fn allowed(&self) -> &BTreeSet<PermissionId> {
        &self.allowed
    }

    /// Consumes the value and returns the allowed set.
    #[must_use]
    pub fn into_allowed(self) -> BTreeSet<PermissionId> {
        self.allowed
    }
}
