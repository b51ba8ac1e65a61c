use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tenantry_core::{AppError, AppResult, TenantId, UserId};
use tenantry_domain::{
    MembershipPermissionOverride, MembershipStatus, OverrideEffect, Permission, PermissionId,
    PermissionKey, Role, RoleId, SetMutation, TenantMembership,
};
use tokio::sync::Mutex;

use crate::{
    CachedEffectivePermissions, EffectivePermissionCache, MembershipRepository,
    OverrideRepository, PermissionListEntry, PermissionListQuery, PermissionRepository,
    RoleListQuery, RoleRepository,
};

/// Single fake backing every port, counting store calls.
#[derive(Default)]
pub struct FakeStore {
    permissions: Mutex<Vec<PermissionListEntry>>,
    roles: Mutex<Vec<Role>>,
    memberships: Mutex<HashMap<(TenantId, UserId), TenantMembership>>,
    overrides: Mutex<Vec<MembershipPermissionOverride>>,
    cache: Mutex<HashMap<(TenantId, UserId), CachedEffectivePermissions>>,
    calls: AtomicUsize,
    pub fail_version_bump: AtomicBool,
    pub override_list_calls: AtomicUsize,
}

impl FakeStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn tenant(value: &str) -> TenantId {
    match TenantId::new(value) {
        Ok(value) => value,
        Err(error) => panic!("tenant id should be valid: {error}"),
    }
}

pub fn user(value: &str) -> UserId {
    match UserId::new(value) {
        Ok(value) => value,
        Err(error) => panic!("user id should be valid: {error}"),
    }
}

pub fn permission_id(value: &str) -> PermissionId {
    match PermissionId::new(value) {
        Ok(value) => value,
        Err(error) => panic!("permission id should be valid: {error}"),
    }
}

pub fn role_id(value: &str) -> RoleId {
    match RoleId::new(value) {
        Ok(value) => value,
        Err(error) => panic!("role id should be valid: {error}"),
    }
}

#[async_trait]
impl PermissionRepository for FakeStore {
    async fn create_permission(&self, permission: Permission) -> AppResult<Permission> {
        self.touch();
        let mut permissions = self.permissions.lock().await;
        if permissions
            .iter()
            .any(|entry| entry.permission.key() == permission.key())
        {
            return Err(AppError::Conflict("duplicate permission key".to_owned()));
        }

        let position = i64::try_from(permissions.len()).unwrap_or(i64::MAX) + 1;
        permissions.push(PermissionListEntry {
            position,
            permission: permission.clone(),
        });
        Ok(permission)
    }

    async fn find_permission(
        &self,
        permission_id: &PermissionId,
    ) -> AppResult<Option<Permission>> {
        self.touch();
        Ok(self
            .permissions
            .lock()
            .await
            .iter()
            .find(|entry| entry.permission.permission_id() == permission_id)
            .map(|entry| entry.permission.clone()))
    }

    async fn find_permission_by_key(&self, key: &PermissionKey) -> AppResult<Option<Permission>> {
        self.touch();
        Ok(self
            .permissions
            .lock()
            .await
            .iter()
            .find(|entry| entry.permission.key() == key)
            .map(|entry| entry.permission.clone()))
    }

    async fn find_existing_permission_ids(
        &self,
        permission_ids: &BTreeSet<PermissionId>,
    ) -> AppResult<BTreeSet<PermissionId>> {
        self.touch();
        Ok(self
            .permissions
            .lock()
            .await
            .iter()
            .map(|entry| entry.permission.permission_id())
            .filter(|value| permission_ids.contains(*value))
            .cloned()
            .collect())
    }

    async fn deprecate_permission(
        &self,
        permission_id: &PermissionId,
    ) -> AppResult<Option<Permission>> {
        self.touch();
        let mut permissions = self.permissions.lock().await;
        Ok(permissions
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
        self.touch();
        Ok(self
            .permissions
            .lock()
            .await
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

#[async_trait]
impl RoleRepository for FakeStore {
    async fn create_role(&self, role: Role) -> AppResult<Role> {
        self.touch();
        let mut roles = self.roles.lock().await;
        if roles
            .iter()
            .any(|value| value.tenant_id() == role.tenant_id() && value.name() == role.name())
        {
            return Err(AppError::Conflict("duplicate role name".to_owned()));
        }
        roles.push(role.clone());
        Ok(role)
    }

    async fn update_role_permissions(
        &self,
        tenant_id: &TenantId,
        role_id: &RoleId,
        mutation: &SetMutation<PermissionId>,
    ) -> AppResult<Option<Role>> {
        self.touch();
        let mut roles = self.roles.lock().await;
        Ok(roles
            .iter_mut()
            .find(|role| role.tenant_id() == tenant_id && role.role_id() == role_id)
            .map(|role| {
                role.apply_permission_mutation(mutation, Utc::now());
                role.clone()
            }))
    }

    async fn list_roles(&self, tenant_id: &TenantId, query: RoleListQuery) -> AppResult<Vec<Role>> {
        self.touch();
        let mut roles: Vec<Role> = self
            .roles
            .lock()
            .await
            .iter()
            .filter(|role| role.tenant_id() == tenant_id)
            .cloned()
            .collect();
        roles.sort_by(|left, right| {
            (left.created_at(), left.role_id()).cmp(&(right.created_at(), right.role_id()))
        });

        Ok(roles
            .into_iter()
            .filter(|role| {
                query.after.as_ref().is_none_or(|cursor| {
                    (role.created_at(), role.role_id().as_str())
                        > (cursor.created_at, cursor.role_id.as_str())
                })
            })
            .take(query.fetch_limit)
            .collect())
    }

    async fn find_roles(
        &self,
        tenant_id: &TenantId,
        role_ids: &BTreeSet<RoleId>,
    ) -> AppResult<Vec<Role>> {
        self.touch();
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .filter(|role| role.tenant_id() == tenant_id && role_ids.contains(role.role_id()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MembershipRepository for FakeStore {
    async fn create_membership(
        &self,
        membership: TenantMembership,
    ) -> AppResult<TenantMembership> {
        self.touch();
        let key = (membership.tenant_id().clone(), membership.user_id().clone());
        let mut memberships = self.memberships.lock().await;
        if memberships.contains_key(&key) {
            return Err(AppError::Conflict("duplicate membership".to_owned()));
        }
        memberships.insert(key, membership.clone());
        Ok(membership)
    }

    async fn find_membership(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Option<TenantMembership>> {
        self.touch();
        Ok(self
            .memberships
            .lock()
            .await
            .get(&(tenant_id.clone(), user_id.clone()))
            .cloned())
    }

    async fn update_membership_roles(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        mutation: &SetMutation<RoleId>,
    ) -> AppResult<Option<TenantMembership>> {
        self.touch();
        let mut memberships = self.memberships.lock().await;
        Ok(memberships
            .get_mut(&(tenant_id.clone(), user_id.clone()))
            .map(|membership| {
                membership.apply_role_mutation(mutation, Utc::now());
                membership.clone()
            }))
    }

    async fn update_membership_status(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        status: MembershipStatus,
    ) -> AppResult<Option<TenantMembership>> {
        self.touch();
        let mut memberships = self.memberships.lock().await;
        Ok(memberships
            .get_mut(&(tenant_id.clone(), user_id.clone()))
            .map(|membership| {
                membership.set_status(status, Utc::now());
                membership.clone()
            }))
    }

    async fn activate_invited_membership(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Option<TenantMembership>> {
        self.touch();
        let mut memberships = self.memberships.lock().await;
        Ok(memberships
            .get_mut(&(tenant_id.clone(), user_id.clone()))
            .and_then(|membership| {
                membership
                    .activate_invitation(Utc::now())
                    .ok()
                    .map(|()| membership.clone())
            }))
    }

    async fn increment_membership_version(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Option<TenantMembership>> {
        self.touch();
        if self.fail_version_bump.load(Ordering::SeqCst) {
            return Err(AppError::Internal("version bump unavailable".to_owned()));
        }

        let mut memberships = self.memberships.lock().await;
        Ok(memberships
            .get_mut(&(tenant_id.clone(), user_id.clone()))
            .map(|membership| {
                membership.bump_version(Utc::now());
                membership.clone()
            }))
    }
}

#[async_trait]
impl OverrideRepository for FakeStore {
    async fn upsert_override(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        permission_id: &PermissionId,
        effect: OverrideEffect,
        reason: Option<String>,
    ) -> AppResult<MembershipPermissionOverride> {
        self.touch();
        let mut overrides = self.overrides.lock().await;
        if let Some(existing) = overrides.iter_mut().find(|value| {
            value.tenant_id() == tenant_id
                && value.user_id() == user_id
                && value.permission_id() == permission_id
        }) {
            existing.replace(effect, reason, Utc::now());
            return Ok(existing.clone());
        }

        let record = MembershipPermissionOverride::new(
            tenant_id.clone(),
            user_id.clone(),
            permission_id.clone(),
            effect,
            reason,
            Utc::now(),
        );
        overrides.push(record.clone());
        Ok(record)
    }

    async fn delete_override(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        permission_id: &PermissionId,
    ) -> AppResult<Option<MembershipPermissionOverride>> {
        self.touch();
        let mut overrides = self.overrides.lock().await;
        let position = overrides.iter().position(|value| {
            value.tenant_id() == tenant_id
                && value.user_id() == user_id
                && value.permission_id() == permission_id
        });
        Ok(position.map(|index| overrides.remove(index)))
    }

    async fn list_overrides(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Vec<MembershipPermissionOverride>> {
        self.touch();
        self.override_list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .overrides
            .lock()
            .await
            .iter()
            .filter(|value| value.tenant_id() == tenant_id && value.user_id() == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EffectivePermissionCache for FakeStore {
    async fn get(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Option<CachedEffectivePermissions>> {
        Ok(self
            .cache
            .lock()
            .await
            .get(&(tenant_id.clone(), user_id.clone()))
            .cloned())
    }

    async fn put(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        entry: CachedEffectivePermissions,
    ) -> AppResult<()> {
        self.cache
            .lock()
            .await
            .insert((tenant_id.clone(), user_id.clone()), entry);
        Ok(())
    }
}
