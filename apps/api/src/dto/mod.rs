mod authorization;
mod common;
mod memberships;
mod overrides;
mod permissions;
mod roles;

pub use authorization::{EffectivePermissionsResponse, PermissionDecisionResponse};
pub use common::{HealthResponse, PageQuery};
pub use memberships::{MemberRequest, MembershipResponse, UpdateMembershipRolesRequest};
pub use overrides::{
    OverrideRemovalResponse, OverrideResponse, OverrideWriteResponse, SetOverrideRequest,
};
pub use permissions::{
    CreatePermissionRequest, ListPermissionsQuery, PermissionPageResponse, PermissionResponse,
};
pub use roles::{CreateRoleRequest, RolePageResponse, RoleResponse, UpdateRolePermissionsRequest};
