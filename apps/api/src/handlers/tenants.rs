use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tenantry_domain::OverrideEffect;

use super::{
    optional_timestamp, permission_id, permission_ids, role_id, role_ids, tenant_id, user_id,
};
use crate::dto::{
    CreateRoleRequest, EffectivePermissionsResponse, MemberRequest, MembershipResponse,
    OverrideRemovalResponse, OverrideResponse, OverrideWriteResponse, PageQuery,
    PermissionDecisionResponse, RolePageResponse, RoleResponse, SetOverrideRequest,
    UpdateMembershipRolesRequest, UpdateRolePermissionsRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod authorization;
mod memberships;
mod overrides;
mod roles;

#[cfg(test)]
mod tests;

pub use authorization::{effective_permissions_handler, permission_decision_handler};
pub use memberships::{
    activate_membership_handler, add_member_handler, get_membership_handler,
    invite_member_handler, suspend_membership_handler, unsuspend_membership_handler,
    update_membership_roles_handler,
};
pub use overrides::{
    allow_permission_handler, deny_permission_handler, list_overrides_handler,
    remove_override_handler,
};
pub use roles::{create_role_handler, list_roles_handler, update_role_permissions_handler};
