use std::sync::Arc;

use chrono::Utc;
use tenantry_core::{AppError, AppResult, PageLimit, TenantId};
use tenantry_domain::{PermissionId, Role, RoleId, SetMutation};
use tracing::info;

use crate::cursor::{Page, decode_cursor};
use crate::permission_ports::PermissionRepository;
use crate::role_ports::{RoleCursor, RoleListQuery, RoleRepository};


/// Application service for tenant-scoped roles.
#[derive(Clone)]
pub struct RoleService {
    repository: Arc<dyn RoleRepository>,
    permission_repository: Arc<dyn PermissionRepository>,
}

impl RoleService {
    /// Creates a new role service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn RoleRepository>,
        permission_repository: Arc<dyn PermissionRepository>,
    ) -> Self {
        Self {
            repository,
            permission_repository,
        }
    }

    /// Creates an empty role at version 1.
    pub async fn create_role(&self, tenant_id: &TenantId, name: &str) -> AppResult<Role> {
        let role = Role::new(tenant_id.clone(), name, Utc::now())?;
        let role = self.repository.create_role(role).await?;

        info!(
            tenant_id = %tenant_id,
            role_id = %role.role_id(),
            name = role.name().as_str(),
            "role created"
        );
        Ok(role)
    }

    /// Adds and removes permissions on a role and bumps its version.
    ///
    /// Every referenced permission must exist, deprecated ones included. The
    /// mutation is rejected in full otherwise.
    pub async fn update_role_permissions(
        &self,
        tenant_id: &TenantId,
        role_id: &RoleId,
        add: Vec<PermissionId>,
        remove: Vec<PermissionId>,
    ) -> AppResult<Role> {
        let mutation = SetMutation::new(add, remove)?;

        let referenced = mutation.referenced();
        let existing = self
            .permission_repository
            .find_existing_permission_ids(&referenced)
            .await?;
        if existing.len() != referenced.len() {
            return Err(AppError::Validation("invalid permission id(s)".to_owned()));
        }

        let role = self
            .repository
            .update_role_permissions(tenant_id, role_id, &mutation)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("role '{role_id}' not found in tenant '{tenant_id}'"))
            })?;

        info!(
            tenant_id = %tenant_id,
            role_id = %role_id,
            added = mutation.add().len(),
            removed = mutation.remove().len(),
            role_version = role.role_version(),
            "role permissions updated"
        );
        Ok(role)
    }

    /// Lists tenant roles in creation order with cursor pagination.
    pub async fn list_roles(
        &self,
        tenant_id: &TenantId,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> AppResult<Page<Role>> {
        let limit = PageLimit::new(limit)?;
        let after = cursor.map(decode_cursor::<RoleCursor>).transpose()?;

        let rows = self
            .repository
            .list_roles(
                tenant_id,
                RoleListQuery {
                    after,
                    fetch_limit: limit.fetch_size(),
                },
            )
            .await?;

        Page::from_overfetch(rows, limit, RoleCursor::of)
    }
}
