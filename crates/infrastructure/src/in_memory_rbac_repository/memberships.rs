use async_trait::async_trait;
use chrono::Utc;
use tenantry_application::MembershipRepository;
use tenantry_core::{AppError, AppResult, TenantId, UserId};
use tenantry_domain::{MembershipStatus, RoleId, SetMutation, TenantMembership};

use super::InMemoryRbacRepository;

#[async_trait]
impl MembershipRepository for InMemoryRbacRepository {
    async fn create_membership(
        &self,
        membership: TenantMembership,
    ) -> AppResult<TenantMembership> {
        let key = (membership.tenant_id().clone(), membership.user_id().clone());
        let mut memberships = self.memberships.write().await;

        if let Some(existing) = memberships.get(&key) {
            return Err(AppError::Conflict(format!(
                "user already has {} membership in this tenant",
                existing.status()
            )));
        }

        memberships.insert(key, membership.clone());
        Ok(membership)
    }

    async fn find_membership(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Option<TenantMembership>> {
        Ok(self
            .memberships
            .read()
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
        let mut memberships = self.memberships.write().await;

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
        let mut memberships = self.memberships.write().await;

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
        let mut memberships = self.memberships.write().await;

        let Some(membership) = memberships.get_mut(&(tenant_id.clone(), user_id.clone())) else {
            return Ok(None);
        };
        if membership.status() != MembershipStatus::Invited {
            return Ok(None);
        }

        membership.activate_invitation(Utc::now())?;
        Ok(Some(membership.clone()))
    }

    async fn increment_membership_version(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Option<TenantMembership>> {
        let mut memberships = self.memberships.write().await;

        Ok(memberships
            .get_mut(&(tenant_id.clone(), user_id.clone()))
            .map(|membership| {
                membership.bump_version(Utc::now());
                membership.clone()
            }))
    }
}
