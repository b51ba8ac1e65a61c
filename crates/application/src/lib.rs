//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_ports;
mod authorization_service;
mod cursor;
mod membership_ports;
mod membership_service;
mod override_service;
mod permission_ports;
mod permission_registry_service;
mod role_ports;
mod role_service;

#[cfg(test)]
mod test_support;

pub use authorization_ports::{
    CachedEffectivePermissions, EffectivePermissionCache, PermissionFingerprint,
};
pub use authorization_service::{AuthorizationService, EffectivePermissionsView};
pub use cursor::Page;
pub use membership_ports::{MembershipRepository, OverrideRepository};
pub use membership_service::MembershipService;
pub use override_service::{OverrideRemoval, OverrideService, OverrideWrite};
pub use permission_ports::{PermissionListEntry, PermissionListQuery, PermissionRepository};
pub use permission_registry_service::{ListPermissionsInput, PermissionRegistryService};
pub use role_ports::{RoleCursor, RoleListQuery, RoleRepository};
pub use role_service::RoleService;
