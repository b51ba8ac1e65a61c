use std::collections::HashMap;

use async_trait::async_trait;
use tenantry_application::{CachedEffectivePermissions, EffectivePermissionCache};
use tenantry_core::{AppResult, TenantId, UserId};
use tokio::sync::RwLock;

/// In-memory cache adapter for resolved permission sets.
///
/// Entries carry the version fingerprint they were computed from; staleness
/// is decided by the caller comparing fingerprints.
#[derive(Default)]
pub struct InMemoryEffectivePermissionCache {
    entries: RwLock<HashMap<(TenantId, UserId), CachedEffectivePermissions>>,
}

impl InMemoryEffectivePermissionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EffectivePermissionCache for InMemoryEffectivePermissionCache {
    async fn get(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> AppResult<Option<CachedEffectivePermissions>> {
        Ok(self
            .entries
            .read()
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
        self.entries
            .write()
            .await
            .insert((tenant_id.clone(), user_id.clone()), entry);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use tenantry_application::{
        CachedEffectivePermissions, EffectivePermissionCache, PermissionFingerprint,
    };
    use tenantry_core::{TenantId, UserId};

    use super::InMemoryEffectivePermissionCache;

    #[tokio::test]
    async fn put_replaces_previous_entry() {
        let cache = InMemoryEffectivePermissionCache::new();
        let tenant_id = TenantId::new("t1").unwrap_or_else(|_| unreachable!());
        let user_id = UserId::new("u1").unwrap_or_else(|_| unreachable!());

        for version in [1, 2] {
            let stored = cache
                .put(
                    &tenant_id,
                    &user_id,
                    CachedEffectivePermissions {
                        fingerprint: PermissionFingerprint {
                            membership_version: version,
                            role_versions: BTreeMap::new(),
                        },
                        allowed: BTreeSet::new(),
                    },
                )
                .await;
            assert!(stored.is_ok());
        }

        let entry = cache.get(&tenant_id, &user_id).await;
        assert!(matches!(entry, Ok(Some(ref value)) if value.fingerprint.membership_version == 2));
    }
}
