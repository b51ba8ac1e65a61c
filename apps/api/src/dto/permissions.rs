use serde::{Deserialize, Serialize};
use tenantry_application::Page;
use tenantry_domain::Permission;
use ts_rs::TS;

use super::common::timestamp;

/// Incoming payload for permission registration.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-permission-request.ts"
)]
pub struct CreatePermissionRequest {
    pub key: String,
    pub description: String,
}

/// Query parameters for the permission catalog listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListPermissionsQuery {
    pub status: Option<String>,
    pub q: Option<String>,
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

/// API representation of a catalog permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub permission_id: String,
    pub key: String,
    pub description: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One page of catalog permissions.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-page-response.ts"
)]
pub struct PermissionPageResponse {
    pub items: Vec<PermissionResponse>,
    pub limit: usize,
    pub next_cursor: Option<String>,
}

impl From<Permission> for PermissionResponse {
    fn from(value: Permission) -> Self {
        Self {
            permission_id: value.permission_id().as_str().to_owned(),
            key: value.key().as_str().to_owned(),
            description: value.description().to_owned(),
            status: value.status().as_str().to_owned(),
            created_at: timestamp(value.created_at()),
            updated_at: timestamp(value.updated_at()),
        }
    }
}

impl From<Page<Permission>> for PermissionPageResponse {
    fn from(value: Page<Permission>) -> Self {
        let page = value.map(PermissionResponse::from);
        Self {
            items: page.items,
            limit: page.limit,
            next_cursor: page.next_cursor,
        }
    }
}
