use serde::{Deserialize, Serialize};
use tenantry_application::Page;
use tenantry_domain::Role;
use ts_rs::TS;

use super::common::timestamp;

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
}

/// Incoming payload for a role permission mutation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-role-permissions-request.ts"
)]
pub struct UpdateRolePermissionsRequest {
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub remove: Vec<String>,
}

/// API representation of a tenant role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub tenant_id: String,
    pub name: String,
    pub status: String,
    pub permissions: Vec<String>,
    pub role_version: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// One page of tenant roles.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-page-response.ts"
)]
pub struct RolePageResponse {
    pub items: Vec<RoleResponse>,
    pub limit: usize,
    pub next_cursor: Option<String>,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            role_id: value.role_id().as_str().to_owned(),
            tenant_id: value.tenant_id().as_str().to_owned(),
            name: value.name().as_str().to_owned(),
            status: value.status().as_str().to_owned(),
            permissions: value
                .permissions()
                .iter()
                .map(|permission_id| permission_id.as_str().to_owned())
                .collect(),
            role_version: value.role_version(),
            created_at: timestamp(value.created_at()),
            updated_at: timestamp(value.updated_at()),
        }
    }
}

impl From<Page<Role>> for RolePageResponse {
    fn from(value: Page<Role>) -> Self {
        let page = value.map(RoleResponse::from);
        Self {
            items: page.items,
            limit: page.limit,
            next_cursor: page.next_cursor,
        }
    }
}
