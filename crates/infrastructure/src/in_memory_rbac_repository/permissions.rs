use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use tenantry_application::{PermissionListEntry, PermissionListQuery, PermissionRepository};
use tenantry_core::{AppError, AppResult};
use tenantry_domain::{Permission, PermissionId, PermissionKey};

use super::InMemoryRbacRepository;

#[async_trait]
impl PermissionRepository for InMemoryRbacRepository {
    async fn create_permission(&self, permission: Permission) -> AppResult<Permission> {
        let mut table = self.permissions.write().await;

        if table
            .rows
            .iter()
            .any(|entry| entry.permission.key() == permission.key())
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                permission.key().as_str()
            )));
        }

        table.next_position += 1;
        let position = table.next_position;
        table.rows.push(PermissionListEntry {
            position,
            permission: permission.clone(),
        });

        Ok(permission)
    }

    async fn find_permission(
        &self,
        permission_id: &PermissionId,
    ) -> AppResult<Option<Permission>> {
        let table = self.permissions.read().await;

        Ok(table
            .rows
            .iter()
            .find(|entry| entry.permission.permission_id() == permission_id)
            .map(|entry| entry.permission.clone()))
    }

    async fn find_permission_by_key(&self, key: &PermissionKey) -> AppResult<Option<Permission>> {
        let table = self.permissions.read().await;

        Ok(table
            .rows
            .iter()
            .find(|entry| entry.permission.key() == key)
            .map(|entry| entry.permission.clone()))
    }

    async fn find_existing_permission_ids(
        &self,
        permission_ids: &BTreeSet<PermissionId>,
    ) -> AppResult<BTreeSet<PermissionId>> {
        let table = self.permissions.read().await;

        Ok(table
            .rows
            .iter()
            .map(|entry| entry.permission.permission_id())
            .filter(|permission_id| permission_ids.contains(*permission_id))
            .cloned()
            .collect())
    }

    async fn deprecate_permission(
        &self,
        permission_id: &PermissionId,
    ) -> AppResult<Option<Permission>> {
        let mut table = self.permissions.write().await;

        Ok(table
            .rows
            .iter_mut()
            .find(|entry| entry.permission.permission_id() == permission_id)
            .map(|entry| {
                entry.permission.deprecate(Utc::now());
                entry.permission.clone()
            }))
    }

    async fn list_permissions(
        &self,
        query: PermissionListQuery,
    ) -> AppResult<Vec<PermissionListEntry>> {
        let table = self.permissions.read().await;

        // Rows are appended in position order.
        Ok(table
            .rows
            .iter()
            .filter(|entry| {
                query
                    .after_position
                    .is_none_or(|position| entry.position > position)
            })
            .filter(|entry| {
                query
                    .status
                    .is_none_or(|status| entry.permission.status() == status)
            })
            .filter(|entry| {
                query
                    .text
                    .as_deref()
                    .is_none_or(|text| entry.permission.matches_text(text))
            })
            .take(query.fetch_limit)
            .cloned()
            .collect())
    }
}
