use serde::{Deserialize, Serialize};
use tenantry_domain::TenantMembership;
use ts_rs::TS;

use super::common::timestamp;

/// Incoming payload for adding or inviting a member.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/member-request.ts"
)]
pub struct MemberRequest {
    pub user_id: String,
    /// RFC 3339 timestamp.
    pub expires_at: Option<String>,
}

/// Incoming payload for a membership role mutation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-membership-roles-request.ts"
)]
pub struct UpdateMembershipRolesRequest {
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub remove: Vec<String>,
}

/// API representation of a tenant membership.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/membership-response.ts"
)]
pub struct MembershipResponse {
    pub membership_id: String,
    pub tenant_id: String,
    pub user_id: String,
    pub roles: Vec<String>,
    pub status: String,
    pub expires_at: Option<String>,
    pub membership_version: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TenantMembership> for MembershipResponse {
    fn from(value: TenantMembership) -> Self {
        Self {
            membership_id: value.membership_id().as_str().to_owned(),
            tenant_id: value.tenant_id().as_str().to_owned(),
            user_id: value.user_id().as_str().to_owned(),
            roles: value
                .roles()
                .iter()
                .map(|role_id| role_id.as_str().to_owned())
                .collect(),
            status: value.status().as_str().to_owned(),
            expires_at: value.expires_at().map(timestamp),
            membership_version: value.membership_version(),
            created_at: timestamp(value.created_at()),
            updated_at: timestamp(value.updated_at()),
        }
    }
}
