use std::sync::Arc;

use tenantry_application::{
    AuthorizationService, MembershipRepository, MembershipService, OverrideRepository,
    OverrideService, PermissionRegistryService, PermissionRepository, RoleRepository, RoleService,
};
use tenantry_core::AppError;
use tenantry_infrastructure::{
    InMemoryEffectivePermissionCache, InMemoryRbacRepository, PostgresMembershipRepository,
    PostgresOverrideRepository, PostgresPermissionRepository, PostgresRoleRepository,
};

use super::connect_and_migrate;
use crate::api_config::{ApiConfig, StorageBackend};
use crate::state::AppState;

struct Repositories {
    permissions: Arc<dyn PermissionRepository>,
    roles: Arc<dyn RoleRepository>,
    memberships: Arc<dyn MembershipRepository>,
    overrides: Arc<dyn OverrideRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        let repository = Arc::new(InMemoryRbacRepository::new());
        Self {
            permissions: repository.clone(),
            roles: repository.clone(),
            memberships: repository.clone(),
            overrides: repository,
        }
    }
}

pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let repositories = match &config.storage {
        StorageBackend::Memory => Repositories::in_memory(),
        StorageBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = connect_and_migrate(database_url, *max_connections).await?;
            Repositories {
                permissions: Arc::new(PostgresPermissionRepository::new(pool.clone())),
                roles: Arc::new(PostgresRoleRepository::new(pool.clone())),
                memberships: Arc::new(PostgresMembershipRepository::new(pool.clone())),
                overrides: Arc::new(PostgresOverrideRepository::new(pool)),
            }
        }
    };

    Ok(assemble(repositories, config.effective_permission_cache))
}

fn assemble(repositories: Repositories, effective_permission_cache: bool) -> AppState {
    let Repositories {
        permissions,
        roles,
        memberships,
        overrides,
    } = repositories;

    let mut authorization_service =
        AuthorizationService::new(memberships.clone(), roles.clone(), overrides.clone());
    if effective_permission_cache {
        authorization_service =
            authorization_service.with_cache(Arc::new(InMemoryEffectivePermissionCache::new()));
    }

    AppState {
        permission_registry_service: PermissionRegistryService::new(permissions.clone()),
        role_service: RoleService::new(roles.clone(), permissions.clone()),
        membership_service: MembershipService::new(memberships.clone(), roles),
        override_service: OverrideService::new(overrides, memberships, permissions),
        authorization_service,
    }
}

#[cfg(test)]
pub(crate) fn in_memory_app_state() -> AppState {
    assemble(Repositories::in_memory(), true)
}
