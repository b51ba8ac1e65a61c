use async_trait::async_trait;
use tenantry_core::{AppResult, TenantId, UserId};
use tenantry_domain::{
    MembershipPermissionOverride, MembershipStatus, OverrideEffect, PermissionId, RoleId,
    SetMutation, TenantMembership,
};

/// Repository port for tenant memberships.
///
/// Every write that changes a membership increments its version inside the
/// same atomic step.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Persists a new membership. Fails with a conflict when `(tenant, user)` exists.
    async fn create_membership(&self, membership: TenantMembership)
    -> AppResult<TenantMembership>;

    /// Finds the membership of a user in a tenant.
    async fn find_membership(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Option<TenantMembership>>;

    /// Applies an add/remove mutation to the role set.
    async fn update_membership_roles(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        mutation: &SetMutation<RoleId>,
    ) -> AppResult<Option<TenantMembership>>;

    /// Sets the lifecycle status.
    async fn update_membership_status(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        status: MembershipStatus,
    ) -> AppResult<Option<TenantMembership>>;

    /// Moves an `INVITED` membership to `ACTIVE`. Returns `None` when no
    /// invited membership matches.
    async fn activate_invited_membership(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Option<TenantMembership>>;

    /// Increments the version without any other change.
    async fn increment_membership_version(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Option<TenantMembership>>;
}

/// Repository port for membership permission overrides.
#[async_trait]
pub trait OverrideRepository: Send + Sync {
    /// Inserts or replaces the override for `(tenant, user, permission)`.
    async fn upsert_override(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        permission_id: &PermissionId,
        effect: OverrideEffect,
        reason: Option<String>,
    ) -> AppResult<MembershipPermissionOverride>;

    /// Deletes an override. Returns `None` when nothing was stored.
    async fn delete_override(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        permission_id: &PermissionId,
    ) -> AppResult<Option<MembershipPermissionOverride>>;

    /// Lists every override of one membership.
    async fn list_overrides(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Vec<MembershipPermissionOverride>>;
}
