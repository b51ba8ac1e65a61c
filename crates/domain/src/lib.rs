//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod membership;
mod permission;
mod permission_override;
mod resolution;
mod role;
mod set_mutation;

pub use membership::{MembershipId, MembershipStatus, TenantMembership};
pub use permission::{Permission, PermissionId, PermissionKey, PermissionStatus};
pub use permission_override::{MembershipPermissionOverride, OverrideEffect};
pub use resolution::{Decision, EffectivePermissions, decide};
pub use role::{Role, RoleId, RoleName, RoleStatus};
pub use set_mutation::SetMutation;
