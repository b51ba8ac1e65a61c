use std::sync::Arc;
use std::sync::atomic::Ordering;

use tenantry_core::{AppError, TenantId, UserId};
use tenantry_domain::{Decision, MembershipStatus, OverrideEffect, PermissionId, RoleId};

use super::AuthorizationService;
use crate::test_support::{FakeStore, permission_id, tenant, user};
use crate::{MembershipService, OverrideService, PermissionRegistryService, RoleService};

struct Fixture {
    store: Arc<FakeStore>,
    registry: PermissionRegistryService,
    roles: RoleService,
    memberships: MembershipService,
    overrides: OverrideService,
    authorization: AuthorizationService,
}

fn fixture() -> Fixture {
    let store = FakeStore::shared();
    Fixture {
        registry: PermissionRegistryService::new(store.clone()),
        roles: RoleService::new(store.clone(), store.clone()),
        memberships: MembershipService::new(store.clone(), store.clone()),
        overrides: OverrideService::new(store.clone(), store.clone(), store.clone()),
        authorization: AuthorizationService::new(store.clone(), store.clone(), store.clone())
            .with_cache(store.clone()),
        store,
    }
}

async fn register(fixture: &Fixture, key: &str) -> PermissionId {
    match fixture.registry.create_permission(key, "generated").await {
        Ok(permission) => permission.permission_id().clone(),
        Err(error) => panic!("permission should be created: {error}"),
    }
}

/// Tenant T with role R granting {P1, P2} assigned to active member U.
async fn manager_scenario(
    fixture: &Fixture,
) -> (TenantId, UserId, RoleId, PermissionId, PermissionId) {
    let tenant_id = tenant("T");
    let user_id = user("U");
    let p1 = register(fixture, "P1").await;
    let p2 = register(fixture, "P2").await;

    let Ok(role) = fixture.roles.create_role(&tenant_id, "manager").await else {
        panic!("role should be created");
    };
    let Ok(role) = fixture
        .roles
        .update_role_permissions(
            &tenant_id,
            role.role_id(),
            vec![p1.clone(), p2.clone()],
            Vec::new(),
        )
        .await
    else {
        panic!("role permissions should update");
    };
    assert_eq!(role.role_version(), 2);

    assert!(
        fixture
            .memberships
            .add_member(&tenant_id, &user_id, None)
            .await
            .is_ok()
    );
    assert!(
        fixture
            .memberships
            .update_membership_roles(
                &tenant_id,
                &user_id,
                vec![role.role_id().clone()],
                Vec::new(),
            )
            .await
            .is_ok()
    );

    (tenant_id, user_id, role.role_id().clone(), p1, p2)
}

#[tokio::test]
async fn role_grants_resolve_to_effective_permissions() {
    let fixture = fixture();
    let (tenant_id, user_id, role_id, p1, p2) = manager_scenario(&fixture).await;

    let view = fixture
        .authorization
        .effective_permissions(&tenant_id, &user_id)
        .await;

    let Ok(view) = view else {
        panic!("effective permissions should resolve");
    };
    assert_eq!(view.allowed.len(), 2);
    assert!(view.allowed.contains(&p1) && view.allowed.contains(&p2));
    assert_eq!(view.role_versions.get(&role_id), Some(&2));
    assert_eq!(view.status, MembershipStatus::Active);
}

#[tokio::test]
async fn deny_override_beats_role_grant() {
    let fixture = fixture();
    let (tenant_id, user_id, _, p1, p2) = manager_scenario(&fixture).await;
    let Ok(before) = fixture
        .memberships
        .get_membership(&tenant_id, &user_id)
        .await
    else {
        panic!("membership should exist");
    };

    let write = fixture
        .overrides
        .set_override(&tenant_id, &user_id, &p1, OverrideEffect::Deny, None)
        .await;
    assert!(matches!(write, Ok(ref value)
        if value.membership_version == before.membership_version() + 1));

    assert!(matches!(
        fixture.authorization.decide(&tenant_id, &user_id, &p1).await,
        Ok(Decision::Deny)
    ));
    assert!(matches!(
        fixture.authorization.decide(&tenant_id, &user_id, &p2).await,
        Ok(Decision::Allow)
    ));
}

#[tokio::test]
async fn deny_override_removal_restores_role_grant() {
    let fixture = fixture();
    let (tenant_id, user_id, _, p1, _) = manager_scenario(&fixture).await;
    assert!(
        fixture
            .overrides
            .set_override(&tenant_id, &user_id, &p1, OverrideEffect::Deny, None)
            .await
            .is_ok()
    );
    assert!(matches!(
        fixture.authorization.decide(&tenant_id, &user_id, &p1).await,
        Ok(Decision::Deny)
    ));

    let removal = fixture
        .overrides
        .remove_override(&tenant_id, &user_id, &p1)
        .await;
    assert!(matches!(removal, Ok(ref value)
        if value.version_bumped && value.membership_version == 4));

    let view = fixture
        .authorization
        .effective_permissions(&tenant_id, &user_id)
        .await;
    assert!(matches!(view, Ok(ref value)
        if !value.cached && value.membership_version == 4 && value.allowed.contains(&p1)));
    assert!(matches!(
        fixture.authorization.decide(&tenant_id, &user_id, &p1).await,
        Ok(Decision::Allow)
    ));
}

#[tokio::test]
async fn allow_override_grants_without_role() {
    let fixture = fixture();
    let (tenant_id, user_id, _, _, _) = manager_scenario(&fixture).await;
    let p9 = register(&fixture, "P9").await;

    assert!(
        fixture
            .overrides
            .set_override(&tenant_id, &user_id, &p9, OverrideEffect::Allow, None)
            .await
            .is_ok()
    );

    assert!(
        fixture
            .authorization
            .require_permission(&tenant_id, &user_id, &p9)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn role_removal_revokes_inherited_permission() {
    let fixture = fixture();
    let (tenant_id, user_id, role_id, p1, _) = manager_scenario(&fixture).await;
    assert!(
        fixture
            .memberships
            .update_membership_roles(&tenant_id, &user_id, Vec::new(), vec![role_id])
            .await
            .is_ok()
    );

    let result = fixture
        .authorization
        .require_permission(&tenant_id, &user_id, &p1)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn missing_membership_is_denied_but_not_resolvable() {
    let fixture = fixture();

    let decision = fixture
        .authorization
        .decide(&tenant("T"), &user("nobody"), &permission_id("P1"))
        .await;
    let view = fixture
        .authorization
        .effective_permissions(&tenant("T"), &user("nobody"))
        .await;

    assert!(matches!(decision, Ok(Decision::Deny)));
    assert!(matches!(view, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn suspended_membership_keeps_resolution_and_reports_status() {
    let fixture = fixture();
    let (tenant_id, user_id, _, p1, _) = manager_scenario(&fixture).await;
    assert!(
        fixture
            .memberships
            .suspend_membership(&tenant_id, &user_id)
            .await
            .is_ok()
    );

    let view = fixture
        .authorization
        .effective_permissions(&tenant_id, &user_id)
        .await;

    assert!(matches!(view, Ok(ref value)
        if value.status == MembershipStatus::Suspended && value.allowed.contains(&p1)));
}

#[tokio::test]
async fn cache_is_reused_until_a_version_changes() {
    let fixture = fixture();
    let (tenant_id, user_id, role_id, p1, _) = manager_scenario(&fixture).await;

    let first = fixture
        .authorization
        .effective_permissions(&tenant_id, &user_id)
        .await;
    let second = fixture
        .authorization
        .effective_permissions(&tenant_id, &user_id)
        .await;
    assert!(matches!(first, Ok(ref value) if !value.cached));
    assert!(matches!(second, Ok(ref value) if value.cached));
    let list_calls = fixture.store.override_list_calls.load(Ordering::SeqCst);

    assert!(
        fixture
            .roles
            .update_role_permissions(&tenant_id, &role_id, Vec::new(), vec![p1.clone()])
            .await
            .is_ok()
    );
    let third = fixture
        .authorization
        .effective_permissions(&tenant_id, &user_id)
        .await;

    assert!(matches!(third, Ok(ref value) if !value.cached && !value.allowed.contains(&p1)));
    assert_eq!(
        fixture.store.override_list_calls.load(Ordering::SeqCst),
        list_calls + 1
    );
}

#[tokio::test]
async fn override_write_invalidates_cached_set() {
    let fixture = fixture();
    let (tenant_id, user_id, _, p1, _) = manager_scenario(&fixture).await;
    assert!(
        fixture
            .authorization
            .effective_permissions(&tenant_id, &user_id)
            .await
            .is_ok()
    );

    assert!(
        fixture
            .overrides
            .set_override(&tenant_id, &user_id, &p1, OverrideEffect::Deny, None)
            .await
            .is_ok()
    );

    assert!(matches!(
        fixture.authorization.decide(&tenant_id, &user_id, &p1).await,
        Ok(Decision::Deny)
    ));
}
