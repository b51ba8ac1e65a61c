use tenantry_application::{
    AuthorizationService, MembershipService, OverrideService, PermissionRegistryService,
    RoleService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub permission_registry_service: PermissionRegistryService,
    pub role_service: RoleService,
    pub membership_service: MembershipService,
    pub override_service: OverrideService,
    pub authorization_service: AuthorizationService,
}
