use async_trait::async_trait;
use chrono::Utc;
use tenantry_application::OverrideRepository;
use tenantry_core::{AppResult, TenantId, UserId};
use tenantry_domain::{MembershipPermissionOverride, OverrideEffect, PermissionId};

use super::InMemoryRbacRepository;

#[async_trait]
impl OverrideRepository for InMemoryRbacRepository {
    async fn upsert_override(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        permission_id: &PermissionId,
        effect: OverrideEffect,
        reason: Option<String>,
    ) -> AppResult<MembershipPermissionOverride> {
        let key = (tenant_id.clone(), user_id.clone(), permission_id.clone());
        let mut overrides = self.overrides.write().await;
        let now = Utc::now();

        let record = overrides
            .entry(key)
            .and_modify(|existing| existing.replace(effect, reason.clone(), now))
            .or_insert_with(|| {
                MembershipPermissionOverride::new(
                    tenant_id.clone(),
                    user_id.clone(),
                    permission_id.clone(),
                    effect,
                    reason,
                    now,
                )
            });

        Ok(record.clone())
    }

    async fn delete_override(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        permission_id: &PermissionId,
    ) -> AppResult<Option<MembershipPermissionOverride>> {
        Ok(self.overrides.write().await.remove(&(
            tenant_id.clone(),
            user_id.clone(),
            permission_id.clone(),
        )))
    }

    async fn list_overrides(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Vec<MembershipPermissionOverride>> {
        let overrides = self.overrides.read().await;

        let mut values: Vec<MembershipPermissionOverride> = overrides
            .iter()
            .filter(|((stored_tenant, stored_user, _), _)| {
                stored_tenant == tenant_id && stored_user == user_id
            })
            .map(|(_, value)| value.clone())
            .collect();
        values.sort_by(|left, right| left.permission_id().cmp(right.permission_id()));

        Ok(values)
    }
}
