pub mod health;
pub mod permissions;
pub mod tenants;

use chrono::{DateTime, Utc};
use tenantry_core::{AppError, AppResult, TenantId, UserId};
use tenantry_domain::{PermissionId, RoleId};

fn tenant_id(value: String) -> AppResult<TenantId> {
    TenantId::new(value)
}

fn user_id(value: String) -> AppResult<UserId> {
    UserId::new(value)
}

fn permission_id(value: String) -> AppResult<PermissionId> {
    PermissionId::new(value)
}

fn permission_ids(values: Vec<String>) -> AppResult<Vec<PermissionId>> {
    values.into_iter().map(PermissionId::new).collect()
}

fn role_id(value: String) -> AppResult<RoleId> {
    RoleId::new(value)
}

fn role_ids(values: Vec<String>) -> AppResult<Vec<RoleId>> {
    values.into_iter().map(RoleId::new).collect()
}

fn optional_timestamp(field: &str, value: Option<String>) -> AppResult<Option<DateTime<Utc>>> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw.trim())
                .map(|parsed| parsed.with_timezone(&Utc))
                .map_err(|error| AppError::Validation(format!("invalid {field}: {error}")))
        })
        .transpose()
}
