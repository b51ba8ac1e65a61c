use serde::Serialize;
use tenantry_application::EffectivePermissionsView;
use ts_rs::TS;

/// Version of one role that contributed to a resolution.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-version-response.ts"
)]
pub struct RoleVersionResponse {
    pub role_id: String,
    pub role_version: i64,
}

/// Resolved permission set of a membership.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/effective-permissions-response.ts"
)]
pub struct EffectivePermissionsResponse {
    pub tenant_id: String,
    pub user_id: String,
    pub status: String,
    pub membership_version: i64,
    pub role_versions: Vec<RoleVersionResponse>,
    pub permissions: Vec<String>,
    pub cached: bool,
}

/// Decision for a single permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-decision-response.ts"
)]
pub struct PermissionDecisionResponse {
    pub tenant_id: String,
    pub user_id: String,
    pub permission_id: String,
    pub decision: String,
}

impl From<EffectivePermissionsView> for EffectivePermissionsResponse {
    fn from(value: EffectivePermissionsView) -> Self {
        Self {
            tenant_id: value.tenant_id.as_str().to_owned(),
            user_id: value.user_id.as_str().to_owned(),
            status: value.status.as_str().to_owned(),
            membership_version: value.membership_version,
            role_versions: value
                .role_versions
                .into_iter()
                .map(|(role_id, role_version)| RoleVersionResponse {
                    role_id: role_id.as_str().to_owned(),
                    role_version,
                })
                .collect(),
            permissions: value
                .allowed
                .into_iter()
                .map(|permission_id| permission_id.as_str().to_owned())
                .collect(),
            cached: value.cached,
        }
    }
}
