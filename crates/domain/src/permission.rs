use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tenantry_core::{AppError, AppResult, NonEmptyString};
use uuid::Uuid;

/// Opaque identifier of a registry permission.
///
/// Values are UUID-shaped when generated here, but callers must not rely on any
/// embedded structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(String);

impl PermissionId {
    /// Creates a permission identifier from a transport or storage value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "permission id must not be empty".to_owned(),
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

impl Display for PermissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Human-readable permission key, stored trimmed and upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionKey(String);

impl PermissionKey {
    /// Normalizes and validates a permission key.
    pub fn new(value: impl AsRef<str>) -> AppResult<Self> {
        let normalized = value.as_ref().trim().to_uppercase();
        if normalized.is_empty() {
            return Err(AppError::Validation(
                "permission key is required".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Lifecycle status of a registry permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionStatus {
    /// Permission may be attached to roles and overrides.
    Active,
    /// Permission stays valid where attached but is being phased out.
    Deprecated,
}

impl PermissionStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Deprecated => "DEPRECATED",
        }
    }
}

impl FromStr for PermissionStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ACTIVE" => Ok(Self::Active),
            "DEPRECATED" => Ok(Self::Deprecated),
            _ => Err(AppError::Validation(format!(
                "unknown permission status '{value}'"
            ))),
        }
    }
}

/// Global registry permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    permission_id: PermissionId,
    key: PermissionKey,
    description: NonEmptyString,
    status: PermissionStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Permission {
    /// Creates a new active permission with a generated identifier.
    pub fn new(
        key: impl AsRef<str>,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let key = PermissionKey::new(key)?;
        let description = NonEmptyString::new(description).map_err(|_| {
            AppError::Validation("permission description is required".to_owned())
        })?;

        Ok(Self {
            permission_id: PermissionId::generate(),
            key,
            description,
            status: PermissionStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrates a permission from persisted fields.
    pub fn from_stored(
        permission_id: impl Into<String>,
        key: impl AsRef<str>,
        description: impl Into<String>,
        status: &str,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            permission_id: PermissionId::new(permission_id)?,
            key: PermissionKey::new(key)?,
            description: NonEmptyString::new(description)?,
            status: status.parse()?,
            created_at,
            updated_at,
        })
    }

    /// Returns the stable identifier.
    #[must_use]
    pub fn permission_id(&self) -> &PermissionId {
        &self.permission_id
    }

    /// Returns the normalized key.
    #[must_use]
    pub fn key(&self) -> &PermissionKey {
        &self.key
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub fn status(&self) -> PermissionStatus {
        self.status
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

    /// Marks the permission as deprecated. There is no way back to active.
    pub fn deprecate(&mut self, now: DateTime<Utc>) {
        self.status = PermissionStatus::Deprecated;
        self.updated_at = now;
    }

    /// Case-insensitive substring match against key or description.
    #[must_use]
    pub fn matches_text(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.key.as_str().to_lowercase().contains(needle.as_str())
            || self.description.as_str().to_lowercase().contains(needle.as_str())
    }
}
