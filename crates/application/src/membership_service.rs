use std::sync::Arc;

use chrono::{DateTime, Utc};
use tenantry_core::{AppError, AppResult, TenantId, UserId};
use tenantry_domain::{MembershipStatus, RoleId, SetMutation, TenantMembership};
use tracing::info;

use crate::membership_ports::MembershipRepository;
use crate::role_ports::RoleRepository;


/// Application service for tenant memberships and their role sets.
#[derive(Clone)]
pub struct MembershipService {
    repository: Arc<dyn MembershipRepository>,
    role_repository: Arc<dyn RoleRepository>,
}

impl MembershipService {
    /// Creates a new membership service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn MembershipRepository>,
        role_repository: Arc<dyn RoleRepository>,
    ) -> Self {
        Self {
            repository,
            role_repository,
        }
    }

    /// Returns the membership of a user in a tenant.
    pub async fn get_membership(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<TenantMembership> {
        self.repository
            .find_membership(tenant_id, user_id)
            .await?
            .ok_or_else(|| membership_not_found(tenant_id, user_id))
    }

    /// Adds a user to a tenant as an active member.
    ///
    /// A pending invitation is accepted instead. Any other existing
    /// membership is a conflict.
    pub async fn add_member(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<TenantMembership> {
        if let Some(existing) = self.repository.find_membership(tenant_id, user_id).await? {
            if existing.status() == MembershipStatus::Invited {
                return self.activate_membership(tenant_id, user_id).await;
            }

            return Err(AppError::Conflict(format!(
                "user already has {} membership in this tenant",
                existing.status()
            )));
        }

        let membership = TenantMembership::new(
            tenant_id.clone(),
            user_id.clone(),
            MembershipStatus::Active,
            expires_at,
            Utc::now(),
        )?;
        let membership = self.repository.create_membership(membership).await?;

        info!(tenant_id = %tenant_id, user_id = %user_id, "member added");
        Ok(membership)
    }

    /// Creates a pending invitation for a user.
    pub async fn invite_member(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<TenantMembership> {
        let membership = TenantMembership::new(
            tenant_id.clone(),
            user_id.clone(),
            MembershipStatus::Invited,
            expires_at,
            Utc::now(),
        )?;
        let membership = self.repository.create_membership(membership).await?;

        info!(tenant_id = %tenant_id, user_id = %user_id, "member invited");
        Ok(membership)
    }

    /// Accepts a pending invitation.
    pub async fn activate_membership(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<TenantMembership> {
        if let Some(membership) = self
            .repository
            .activate_invited_membership(tenant_id, user_id)
            .await?
        {
            info!(
                tenant_id = %tenant_id,
                user_id = %user_id,
                membership_version = membership.membership_version(),
                "membership activated"
            );
            return Ok(membership);
        }

        let existing = self.get_membership(tenant_id, user_id).await?;
        Err(AppError::Conflict(format!(
            "membership is {} and cannot be activated",
            existing.status()
        )))
    }

    /// Adds and removes roles on a membership and bumps its version.
    ///
    /// Every referenced role must belong to the tenant.
    pub async fn update_membership_roles(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        add: Vec<RoleId>,
        remove: Vec<RoleId>,
    ) -> AppResult<TenantMembership> {
        let mutation = SetMutation::new(add, remove)?;

        let referenced = mutation.referenced();
        let resolved = self
            .role_repository
            .find_roles(tenant_id, &referenced)
            .await?;
        let all_resolved = referenced.iter().all(|role_id| {
            resolved
                .iter()
                .any(|role| role.role_id() == role_id && role.tenant_id() == tenant_id)
        });
        if !all_resolved {
            return Err(AppError::Validation(
                "invalid role id(s) for tenant".to_owned(),
            ));
        }

        let membership = self
            .repository
            .update_membership_roles(tenant_id, user_id, &mutation)
            .await?
            .ok_or_else(|| membership_not_found(tenant_id, user_id))?;

        info!(
            tenant_id = %tenant_id,
            user_id = %user_id,
            added = mutation.add().len(),
            removed = mutation.remove().len(),
            membership_version = membership.membership_version(),
            "membership roles updated"
        );
        Ok(membership)
    }

    /// Suspends a membership. Repeated calls still bump the version.
    pub async fn suspend_membership(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<TenantMembership> {
        self.set_status(tenant_id, user_id, MembershipStatus::Suspended)
            .await
    }

    /// Restores a suspended membership to active.
    pub async fn unsuspend_membership(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<TenantMembership> {
        self.set_status(tenant_id, user_id, MembershipStatus::Active)
            .await
    }

    async fn set_status(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        status: MembershipStatus,
    ) -> AppResult<TenantMembership> {
        let membership = self
            .repository
            .update_membership_status(tenant_id, user_id, status)
            .await?
            .ok_or_else(|| membership_not_found(tenant_id, user_id))?;

        info!(
            tenant_id = %tenant_id,
            user_id = %user_id,
            status = status.as_str(),
            membership_version = membership.membership_version(),
            "membership status changed"
        );
        Ok(membership)
    }
}

pub(crate) fn membership_not_found(tenant_id: &TenantId, user_id: &UserId) -> AppError {
    AppError::NotFound(format!(
        "membership for user '{user_id}' not found in tenant '{tenant_id}'"
    ))
}
