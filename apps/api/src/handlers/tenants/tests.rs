use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tenantry_core::AppError;

use super::{
    add_member_handler, create_role_handler, deny_permission_handler,
    effective_permissions_handler, invite_member_handler, permission_decision_handler,
    remove_override_handler, update_membership_roles_handler, update_role_permissions_handler,
};
use crate::api_services::in_memory_app_state;
use crate::dto::{
    CreatePermissionRequest, CreateRoleRequest, MemberRequest, SetOverrideRequest,
    UpdateMembershipRolesRequest, UpdateRolePermissionsRequest,
};
use crate::error::ApiError;
use crate::handlers::permissions::create_permission_handler;
use crate::state::AppState;

const TENANT: &str = "t1";
const USER: &str = "u1";

fn member_path() -> Path<(String, String)> {
    Path((TENANT.to_owned(), USER.to_owned()))
}

async fn permission(state: &AppState, key: &str) -> String {
    let created = create_permission_handler(
        State(state.clone()),
        Json(CreatePermissionRequest {
            key: key.to_owned(),
            description: format!("{key} access"),
        }),
    )
    .await;
    assert!(matches!(created, Ok((status, _)) if status == StatusCode::CREATED));

    created
        .map(|(_, Json(response))| response.permission_id)
        .unwrap_or_else(|_| unreachable!())
}

/// Seeds a manager role granting two permissions and assigns it to the member.
async fn manager_scenario(state: &AppState) -> (String, String) {
    let p1 = permission(state, "orders.read").await;
    let p2 = permission(state, "orders.write").await;

    let role = create_role_handler(
        State(state.clone()),
        Path(TENANT.to_owned()),
        Json(CreateRoleRequest {
            name: "manager".to_owned(),
        }),
    )
    .await
    .map(|(_, Json(response))| response.role_id)
    .unwrap_or_else(|_| unreachable!());

    let updated = update_role_permissions_handler(
        State(state.clone()),
        Path((TENANT.to_owned(), role.clone())),
        Json(UpdateRolePermissionsRequest {
            add: vec![p1.clone(), p2.clone()],
            remove: Vec::new(),
        }),
    )
    .await;
    assert!(matches!(updated, Ok(Json(ref value)) if value.role_version == 2));

    let added = add_member_handler(
        State(state.clone()),
        Path(TENANT.to_owned()),
        Json(MemberRequest {
            user_id: USER.to_owned(),
            expires_at: None,
        }),
    )
    .await;
    assert!(added.is_ok());

    let assigned = update_membership_roles_handler(
        State(state.clone()),
        member_path(),
        Json(UpdateMembershipRolesRequest {
            add: vec![role],
            remove: Vec::new(),
        }),
    )
    .await;
    assert!(matches!(assigned, Ok(Json(ref value)) if value.membership_version == 2));

    (p1, p2)
}

#[tokio::test]
async fn role_grants_show_up_in_effective_permissions() {
    let state = in_memory_app_state();
    let (p1, p2) = manager_scenario(&state).await;

    let view = effective_permissions_handler(State(state), member_path()).await;

    assert!(matches!(view, Ok(Json(ref value))
        if value.permissions.contains(&p1)
            && value.permissions.contains(&p2)
            && value.membership_version == 2
            && value.status == "ACTIVE"));
}

#[tokio::test]
async fn deny_override_wins_over_role_grant() {
    let state = in_memory_app_state();
    let (p1, p2) = manager_scenario(&state).await;

    let write = deny_permission_handler(
        State(state.clone()),
        member_path(),
        Json(SetOverrideRequest {
            permission_id: p1.clone(),
            reason: Some("incident review".to_owned()),
        }),
    )
    .await;
    assert!(matches!(write, Ok(Json(ref value))
        if value.membership_version == 3
            && value.version_bumped
            && value.permission_override.effect == "DENY"));

    let denied = permission_decision_handler(
        State(state.clone()),
        Path((TENANT.to_owned(), USER.to_owned(), p1)),
    )
    .await;
    let allowed = permission_decision_handler(
        State(state),
        Path((TENANT.to_owned(), USER.to_owned(), p2)),
    )
    .await;

    assert!(matches!(denied, Ok(Json(ref value)) if value.decision == "DENY"));
    assert!(matches!(allowed, Ok(Json(ref value)) if value.decision == "ALLOW"));
}

#[tokio::test]
async fn empty_role_update_is_rejected() {
    let state = in_memory_app_state();
    let role = create_role_handler(
        State(state.clone()),
        Path(TENANT.to_owned()),
        Json(CreateRoleRequest {
            name: "viewer".to_owned(),
        }),
    )
    .await
    .map(|(_, Json(response))| response.role_id)
    .unwrap_or_else(|_| unreachable!());

    let result = update_role_permissions_handler(
        State(state),
        Path((TENANT.to_owned(), role)),
        Json(UpdateRolePermissionsRequest {
            add: Vec::new(),
            remove: Vec::new(),
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::Validation(_)))));
}

#[tokio::test]
async fn invitation_rejects_malformed_expiry() {
    let state = in_memory_app_state();

    let result = invite_member_handler(
        State(state),
        Path(TENANT.to_owned()),
        Json(MemberRequest {
            user_id: USER.to_owned(),
            expires_at: Some("next tuesday".to_owned()),
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::Validation(_)))));
}

#[tokio::test]
async fn invitation_keeps_expiry() {
    let state = in_memory_app_state();

    let result = invite_member_handler(
        State(state),
        Path(TENANT.to_owned()),
        Json(MemberRequest {
            user_id: USER.to_owned(),
            expires_at: Some("2030-01-01T00:00:00Z".to_owned()),
        }),
    )
    .await;

    assert!(matches!(result, Ok((status, Json(ref value)))
        if status == StatusCode::CREATED
            && value.status == "INVITED"
            && value.expires_at.is_some()));
}

#[tokio::test]
async fn decision_without_membership_is_deny() {
    let state = in_memory_app_state();
    let p1 = permission(&state, "orders.read").await;

    let decision = permission_decision_handler(
        State(state),
        Path((TENANT.to_owned(), "stranger".to_owned(), p1)),
    )
    .await;

    assert!(matches!(decision, Ok(Json(ref value)) if value.decision == "DENY"));
}

#[tokio::test]
async fn removing_an_override_twice_is_not_found() {
    let state = in_memory_app_state();
    let (p1, _) = manager_scenario(&state).await;
    let denied = deny_permission_handler(
        State(state.clone()),
        member_path(),
        Json(SetOverrideRequest {
            permission_id: p1.clone(),
            reason: None,
        }),
    )
    .await;
    assert!(denied.is_ok());

    let first = remove_override_handler(
        State(state.clone()),
        Path((TENANT.to_owned(), USER.to_owned(), p1.clone())),
    )
    .await;
    let second = remove_override_handler(
        State(state),
        Path((TENANT.to_owned(), USER.to_owned(), p1)),
    )
    .await;

    assert!(matches!(first, Ok(Json(ref value)) if value.deleted && value.membership_version == 4));
    assert!(matches!(second, Err(ApiError(AppError::NotFound(_)))));
}
