use serde::{Deserialize, Serialize};
use tenantry_application::{OverrideRemoval, OverrideWrite};
use tenantry_domain::MembershipPermissionOverride;
use ts_rs::TS;

use super::common::timestamp;

/// Incoming payload for an `ALLOW` or `DENY` override.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/set-override-request.ts"
)]
pub struct SetOverrideRequest {
    pub permission_id: String,
    pub reason: Option<String>,
}

/// API representation of a membership permission override.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/override-response.ts"
)]
pub struct OverrideResponse {
    pub tenant_id: String,
    pub user_id: String,
    pub permission_id: String,
    pub effect: String,
    pub reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Result of recording an override.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/override-write-response.ts"
)]
pub struct OverrideWriteResponse {
    #[serde(rename = "override")]
    pub permission_override: OverrideResponse,
    pub membership_version: i64,
    pub version_bumped: bool,
}

/// Result of deleting an override.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/override-removal-response.ts"
)]
pub struct OverrideRemovalResponse {
    pub deleted: bool,
    pub permission_id: String,
    pub membership_version: i64,
    pub version_bumped: bool,
}

impl From<MembershipPermissionOverride> for OverrideResponse {
    fn from(value: MembershipPermissionOverride) -> Self {
        Self {
            tenant_id: value.tenant_id().as_str().to_owned(),
            user_id: value.user_id().as_str().to_owned(),
            permission_id: value.permission_id().as_str().to_owned(),
            effect: value.effect().as_str().to_owned(),
            reason: value.reason().map(str::to_owned),
            created_at: timestamp(value.created_at()),
            updated_at: timestamp(value.updated_at()),
        }
    }
}

impl From<OverrideWrite> for OverrideWriteResponse {
    fn from(value: OverrideWrite) -> Self {
        Self {
            permission_override: OverrideResponse::from(value.record),
            membership_version: value.membership_version,
            version_bumped: value.version_bumped,
        }
    }
}

impl From<OverrideRemoval> for OverrideRemovalResponse {
    fn from(value: OverrideRemoval) -> Self {
        Self {
            deleted: true,
            permission_id: value.removed.permission_id().as_str().to_owned(),
            membership_version: value.membership_version,
            version_bumped: value.version_bumped,
        }
    }
}
