use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tenantry_core::{AppError, AppResult, TenantId, UserId};

use crate::PermissionId;

/// Effect carried by a membership override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideEffect {
    /// Grants the permission regardless of roles, unless a deny exists.
    Allow,
    /// Withholds the permission regardless of roles or allows.
    Deny,
}

impl OverrideEffect {
    /// Returns a stable storage value for this effect.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Deny => "DENY",
        }
    }
}

impl FromStr for OverrideEffect {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_uppercase().as_str() {
            "ALLOW" => Ok(Self::Allow),
            "DENY" => Ok(Self::Deny),
            _ => Err(AppError::Validation(format!(
                "unknown override effect '{value}'"
            ))),
        }
    }
}

/// Membership-scoped exception for a single permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipPermissionOverride {
    tenant_id: TenantId,
    user_id: UserId,
    permission_id: PermissionId,
    effect: OverrideEffect,
    reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MembershipPermissionOverride {
    /// Creates an override record.
    #[must_use]
    pub fn new(
        tenant_id: TenantId,
        user_id: UserId,
        permission_id: PermissionId,
        effect: OverrideEffect,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            tenant_id,
            user_id,
            permission_id,
            effect,
            reason: normalize_reason(reason),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrates an override from persisted fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_stored(
        tenant_id: TenantId,
        user_id: UserId,
        permission_id: impl Into<String>,
        effect: &str,
        reason: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            tenant_id,
            user_id,
            permission_id: PermissionId::new(permission_id)?,
            effect: effect.parse()?,
            reason,
            created_at,
            updated_at,
        })
    }

    /// Returns the tenant.
    #[must_use]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Returns the user.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the overridden permission.
    #[must_use]
    pub fn permission_id(&self) -> &PermissionId {
        &self.permission_id
    }

    /// Returns the effect.
    #[must_use]
    pub fn effect(&self) -> OverrideEffect {
        self.effect
    }

    /// Returns the optional free-text reason.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces effect and reason in place, keeping the creation timestamp.
    pub fn replace(&mut self, effect: OverrideEffect, reason: Option<String>, now: DateTime<Utc>) {
        self.effect = effect;
        self.reason = normalize_reason(reason);
        self.updated_at = now;
    }
}

fn normalize_reason(reason: Option<String>) -> Option<String> {
    reason.filter(|value| !value.trim().is_empty())
}
