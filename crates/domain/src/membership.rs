use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tenantry_core::{AppError, AppResult, TenantId, UserId};
use uuid::Uuid;

use crate::{RoleId, SetMutation};

/// Opaque, immutable membership identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MembershipId(String);

impl MembershipId {
    /// Creates a membership identifier from a storage value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "membership id must not be empty".to_owned(),
            ));
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

impl Display for MembershipId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Lifecycle status of a tenant membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    /// Invitation sent, not yet accepted.
    Invited,
    /// Member in good standing.
    Active,
    /// Temporarily blocked by an administrator.
    Suspended,
    /// Permanently revoked. Reserved: no current flow sets it.
    Revoked,
}

impl MembershipStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invited => "INVITED",
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
            Self::Revoked => "REVOKED",
        }
    }
}

impl FromStr for MembershipStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "INVITED" => Ok(Self::Invited),
            "ACTIVE" => Ok(Self::Active),
            "SUSPENDED" => Ok(Self::Suspended),
            "REVOKED" => Ok(Self::Revoked),
            _ => Err(AppError::Validation(format!(
                "unknown membership status '{value}'"
            ))),
        }
    }
}

impl Display for MembershipStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Per-tenant user record carrying role assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantMembership {
    membership_id: MembershipId,
    tenant_id: TenantId,
    user_id: UserId,
    roles: BTreeSet<RoleId>,
    status: MembershipStatus,
    expires_at: Option<DateTime<Utc>>,
    membership_version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantMembership {
    /// Creates a membership with no roles at version 1.
    ///
    /// Only `Active` and `Invited` are valid initial states.
    pub fn new(
        tenant_id: TenantId,
        user_id: UserId,
        status: MembershipStatus,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        if !matches!(status, MembershipStatus::Active | MembershipStatus::Invited) {
            return Err(AppError::Validation(format!(
                "membership cannot be created with status '{status}'"
            )));
        }

        Ok(Self {
            membership_id: MembershipId::generate(),
            tenant_id,
            user_id,
            roles: BTreeSet::new(),
            status,
            expires_at,
            membership_version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrates a membership from persisted fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_stored(
        membership_id: impl Into<String>,
        tenant_id: TenantId,
        user_id: UserId,
        roles: impl IntoIterator<Item = String>,
        status: &str,
        expires_at: Option<DateTime<Utc>>,
        membership_version: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        if membership_version < 1 {
            return Err(AppError::Internal(format!(
                "stored membership version {membership_version} is below 1"
            )));
        }

        Ok(Self {
            membership_id: MembershipId::new(membership_id)?,
            tenant_id,
            user_id,
            roles: roles
                .into_iter()
                .map(RoleId::new)
                .collect::<AppResult<_>>()?,
            status: status.parse()?,
            expires_at,
            membership_version,
            created_at,
            updated_at,
        })
    }

    /// Returns the stable identifier.
    #[must_use]
    pub fn membership_id(&self) -> &MembershipId {
        &self.membership_id
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

    /// Returns the assigned role identifiers.
    #[must_use]
    pub fn roles(&self) -> &BTreeSet<RoleId> {
        &self.roles
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub fn status(&self) -> MembershipStatus {
        self.status
    }

    /// Returns the optional expiry.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns the optimistic version counter.
    #[must_use]
    pub fn membership_version(&self) -> i64 {
        self.membership_version
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

    /// Applies an accepted role mutation and bumps the version.
    pub fn apply_role_mutation(&mut self, mutation: &SetMutation<RoleId>, now: DateTime<Utc>) {
        mutation.apply_to(&mut self.roles);
        self.bump_version(now);
    }

    /// Sets the status unconditionally and bumps the version.
    pub fn set_status(&mut self, status: MembershipStatus, now: DateTime<Utc>) {
        self.status = status;
        self.bump_version(now);
    }

    /// Moves an invited membership to active.
    pub fn activate_invitation(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if self.status != MembershipStatus::Invited {
            return Err(AppError::Conflict(format!(
                "membership for user '{}' in tenant '{}' is {} and cannot be activated",
                self.user_id, self.tenant_id, self.status
            )));
        }

        self.set_status(MembershipStatus::Active, now);
        Ok(())
    }

    /// Records an accepted mutation that has no field change of its own.
    pub fn bump_version(&mut self, now: DateTime<Utc>) {
        self.membership_version += 1;
        self.updated_at = now;
    }
}
