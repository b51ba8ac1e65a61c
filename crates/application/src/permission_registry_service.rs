use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tenantry_core::{AppError, AppResult, PageLimit};
use tenantry_domain::{Permission, PermissionId, PermissionStatus};
use tracing::info;

use crate::cursor::{Page, decode_cursor};
use crate::permission_ports::{PermissionListQuery, PermissionRepository};

#[cfg(test)]
mod tests;

/// Filters and window for listing the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPermissionsInput {
    /// Optional status filter.
    pub status: Option<PermissionStatus>,
    /// Optional substring matched against key or description.
    pub query: Option<String>,
    /// Requested page size.
    pub limit: Option<usize>,
    /// Opaque cursor from a previous page.
    pub cursor: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PermissionCursor {
    position: i64,
}

/// Application service for the global permission registry.
#[derive(Clone)]
pub struct PermissionRegistryService {
    repository: Arc<dyn PermissionRepository>,
}

impl PermissionRegistryService {
    /// Creates a new registry service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn PermissionRepository>) -> Self {
        Self { repository }
    }

    /// Registers a new active permission.
    pub async fn create_permission(&self, key: &str, description: &str) -> AppResult<Permission> {
        let permission = Permission::new(key, description, Utc::now())?;

        if self
            .repository
            .find_permission_by_key(permission.key())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                permission.key().as_str()
            )));
        }

        let permission = self.repository.create_permission(permission).await?;
        info!(
            permission_id = %permission.permission_id(),
            key = permission.key().as_str(),
            "permission registered"
        );

        Ok(permission)
    }

    /// Marks a permission deprecated. Deprecating twice succeeds.
    pub async fn deprecate_permission(
        &self,
        permission_id: &PermissionId,
    ) -> AppResult<Permission> {
        let permission = self
            .repository
            .deprecate_permission(permission_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("permission '{permission_id}' not found")))?;

        info!(permission_id = %permission_id, "permission deprecated");
        Ok(permission)
    }

    /// Returns one permission.
    pub async fn get_permission(&self, permission_id: &PermissionId) -> AppResult<Permission> {
        self.repository
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("permission '{permission_id}' not found")))
    }

    /// Lists permissions in insertion order with cursor pagination.
    pub async fn list_permissions(
        &self,
        input: ListPermissionsInput,
    ) -> AppResult<Page<Permission>> {
        let limit = PageLimit::new(input.limit)?;
        let after_position = input
            .cursor
            .as_deref()
            .map(decode_cursor::<PermissionCursor>)
            .transpose()?
            .map(|cursor| cursor.position);
        let text = input
            .query
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let rows = self
            .repository
            .list_permissions(PermissionListQuery {
                status: input.status,
                text,
                after_position,
                fetch_limit: limit.fetch_size(),
            })
            .await?;

        Ok(
            Page::from_overfetch(rows, limit, |entry| PermissionCursor {
                position: entry.position,
            })?
            .map(|entry| entry.permission),
        )
    }
}
