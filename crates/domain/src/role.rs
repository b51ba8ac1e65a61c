use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tenantry_core::{AppError, AppResult, TenantId};
use uuid::Uuid;

use crate::{PermissionId, SetMutation};

/// Opaque, immutable role identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    /// Creates a role identifier from a transport or storage value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("role id must not be empty".to_owned()));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the underlying identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Role name, unique per tenant, stored trimmed and upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    /// Normalizes and validates a role name.
    pub fn new(value: impl AsRef<str>) -> AppResult<Self> {
        let normalized = value.as_ref().trim().to_uppercase();
        if normalized.is_empty() {
            return Err(AppError::Validation("role name is required".to_owned()));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Lifecycle status of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleStatus {
    /// Role is usable.
    Active,
    /// Role is retired but kept for existing references.
    Deprecated,
}

impl RoleStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Deprecated => "DEPRECATED",
        }
    }
}

impl FromStr for RoleStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ACTIVE" => Ok(Self::Active),
            "DEPRECATED" => Ok(Self::Deprecated),
            _ => Err(AppError::Validation(format!(
                "unknown role status '{value}'"
            ))),
        }
    }
}

/// Tenant-scoped named permission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    role_id: RoleId,
    tenant_id: TenantId,
    name: RoleName,
    status: RoleStatus,
    permissions: BTreeSet<PermissionId>,
    role_version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Role {
    /// Creates an active role with no permissions at version 1.
    pub fn new(tenant_id: TenantId, name: impl AsRef<str>, now: DateTime<Utc>) -> AppResult<Self> {
        Ok(Self {
            role_id: RoleId::generate(),
            tenant_id,
            name: RoleName::new(name)?,
            status: RoleStatus::Active,
            permissions: BTreeSet::new(),
            role_version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrates a role from persisted fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_stored(
        role_id: impl Into<String>,
        tenant_id: TenantId,
        name: impl AsRef<str>,
        status: &str,
        permissions: impl IntoIterator<Item = String>,
        role_version: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        if role_version < 1 {
            return Err(AppError::Internal(format!(
                "stored role version {role_version} is below 1"
            )));
        }

        Ok(Self {
            role_id: RoleId::new(role_id)?,
            tenant_id,
            name: RoleName::new(name)?,
            status: status.parse()?,
            permissions: permissions
                .into_iter()
                .map(PermissionId::new)
                .collect::<AppResult<_>>()?,
            role_version,
            created_at,
            updated_at,
        })
    }

    /// Returns the stable identifier.
    #[must_use]
    pub fn role_id(&self) -> &RoleId {
        &self.role_id
    }

    /// Returns the owning tenant.
    #[must_use]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Returns the normalized name.
    #[must_use]
    pub fn name(&self) -> &RoleName {
        &self.name
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub fn status(&self) -> RoleStatus {
        self.status
    }

    /// Returns the granted permission identifiers.
    #[must_use]
    pub fn permissions(&self) -> &BTreeSet<PermissionId> {
        &self.permissions
    }

    /// Returns the optimistic version counter.
    #[must_use]
    pub fn role_version(&self) -> i64 {
        self.role_version
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

    /// Applies an accepted permission mutation.
    ///
    /// The version moves by exactly one even when the set does not change.
    pub fn apply_permission_mutation(
        &mut self,
        mutation: &SetMutation<PermissionId>,
        now: DateTime<Utc>,
    ) {
        mutation.apply_to(&mut self.permissions);
        self.role_version += 1;
        self.updated_at = now;
    }
}
