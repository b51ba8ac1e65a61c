use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use tenantry_application::{RoleListQuery, RoleRepository};
use tenantry_core::{AppError, AppResult, TenantId};
use tenantry_domain::{PermissionId, Role, RoleId, SetMutation};

use super::InMemoryRbacRepository;

#[async_trait]
impl RoleRepository for InMemoryRbacRepository {
    async fn create_role(&self, role: Role) -> AppResult<Role> {
        let mut roles = self.roles.write().await;

        if roles
            .values()
            .any(|stored| stored.tenant_id() == role.tenant_id() && stored.name() == role.name())
        {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists for tenant '{}'",
                role.name().as_str(),
                role.tenant_id()
            )));
        }

        roles.insert(
            (role.tenant_id().clone(), role.role_id().clone()),
            role.clone(),
        );
        Ok(role)
    }

    async fn update_role_permissions(
        &self,
        tenant_id: &TenantId,
        role_id: &RoleId,
        mutation: &SetMutation<PermissionId>,
    ) -> AppResult<Option<Role>> {
        let mut roles = self.roles.write().await;

        Ok(roles
            .get_mut(&(tenant_id.clone(), role_id.clone()))
            .map(|role| {
                role.apply_permission_mutation(mutation, Utc::now());
                role.clone()
            }))
    }

    async fn list_roles(&self, tenant_id: &TenantId, query: RoleListQuery) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;

        let mut values: Vec<Role> = roles
            .values()
            .filter(|role| role.tenant_id() == tenant_id)
            .filter(|role| {
                query.after.as_ref().is_none_or(|cursor| {
                    (role.created_at(), role.role_id().as_str())
                        > (cursor.created_at, cursor.role_id.as_str())
                })
            })
            .cloned()
            .collect();

        values.sort_by(|left, right| {
            (left.created_at(), left.role_id()).cmp(&(right.created_at(), right.role_id()))
        });
        values.truncate(query.fetch_limit);

        Ok(values)
    }

    async fn find_roles(
        &self,
        tenant_id: &TenantId,
        role_ids: &BTreeSet<RoleId>,
    ) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;

        Ok(role_ids
            .iter()
            .filter_map(|role_id| roles.get(&(tenant_id.clone(), role_id.clone())))
            .cloned()
            .collect())
    }
}
