use std::collections::BTreeSet;

use tenantry_core::AppError;
use tenantry_domain::PermissionStatus;

use super::{ListPermissionsInput, PermissionRegistryService};
use crate::test_support::{FakeStore, permission_id};

fn service() -> PermissionRegistryService {
    PermissionRegistryService::new(FakeStore::shared())
}

#[tokio::test]
async fn create_permission_normalizes_key() {
    let service = service();

    let created = service
        .create_permission("  orders.read ", "Read orders")
        .await;

    assert!(matches!(created, Ok(ref value)
        if value.key().as_str() == "ORDERS.READ" && value.status() == PermissionStatus::Active));
}

#[tokio::test]
async fn create_permission_rejects_duplicate_normalized_key() {
    let service = service();
    assert!(
        service
            .create_permission("ORDERS.READ", "Read orders")
            .await
            .is_ok()
    );

    let duplicate = service
        .create_permission("orders.read", "Read orders again")
        .await;

    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn create_permission_rejects_blank_fields() {
    let service = service();

    assert!(matches!(
        service.create_permission("   ", "Read orders").await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        service.create_permission("ORDERS.READ", " ").await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn deprecate_permission_is_idempotent() {
    let service = service();
    let Ok(permission) = service.create_permission("ORDERS.READ", "Read orders").await else {
        panic!("permission should be created");
    };

    let first = service
        .deprecate_permission(permission.permission_id())
        .await;
    let second = service
        .deprecate_permission(permission.permission_id())
        .await;

    assert!(matches!(first, Ok(ref value) if value.status() == PermissionStatus::Deprecated));
    assert!(matches!(second, Ok(ref value) if value.status() == PermissionStatus::Deprecated));
}

#[tokio::test]
async fn deprecate_unknown_permission_is_not_found() {
    let result = service()
        .deprecate_permission(&permission_id("missing"))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn get_permission_returns_stored_row_or_not_found() {
    let service = service();
    let Ok(created) = service.create_permission("ledger.close", "Close ledger").await else {
        panic!("permission should be created");
    };

    let found = service.get_permission(created.permission_id()).await;
    let missing = service.get_permission(&permission_id("missing")).await;

    assert!(matches!(found, Ok(ref value)
        if value.permission_id() == created.permission_id()
            && value.key().as_str() == "LEDGER.CLOSE"));
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn list_permissions_walks_every_row_exactly_once() {
    let service = service();
    for index in 0..5 {
        assert!(
            service
                .create_permission(&format!("P{index}"), "generated")
                .await
                .is_ok()
        );
    }

    let mut seen = Vec::new();
    let mut cursor = None;
    let mut pages = 0;
    loop {
        let page = service
            .list_permissions(ListPermissionsInput {
                limit: Some(2),
                cursor: cursor.clone(),
                ..ListPermissionsInput::default()
            })
            .await;
        let Ok(page) = page else {
            panic!("page should load");
        };
        assert!(page.items.len() <= 2);
        pages += 1;
        seen.extend(
            page.items
                .iter()
                .map(|permission| permission.key().as_str().to_owned()),
        );

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(pages, 3);
    assert_eq!(seen, vec!["P0", "P1", "P2", "P3", "P4"]);
    assert_eq!(seen.iter().collect::<BTreeSet<_>>().len(), 5);
}

#[tokio::test]
async fn list_permissions_filters_by_status_and_text() {
    let service = service();
    let Ok(orders) = service.create_permission("ORDERS.READ", "Read orders").await else {
        panic!("permission should be created");
    };
    assert!(
        service
            .create_permission("INVOICES.READ", "Read invoices")
            .await
            .is_ok()
    );
    assert!(
        service
            .deprecate_permission(orders.permission_id())
            .await
            .is_ok()
    );

    let deprecated = service
        .list_permissions(ListPermissionsInput {
            status: Some(PermissionStatus::Deprecated),
            ..ListPermissionsInput::default()
        })
        .await;
    let text = service
        .list_permissions(ListPermissionsInput {
            query: Some("invoice".to_owned()),
            ..ListPermissionsInput::default()
        })
        .await;

    assert!(matches!(deprecated, Ok(ref page)
        if page.items.len() == 1 && page.items[0].key().as_str() == "ORDERS.READ"));
    assert!(matches!(text, Ok(ref page)
        if page.items.len() == 1 && page.items[0].key().as_str() == "INVOICES.READ"));
}

#[tokio::test]
async fn list_permissions_rejects_zero_limit_and_bad_cursor() {
    let service = service();

    let zero = service
        .list_permissions(ListPermissionsInput {
            limit: Some(0),
            ..ListPermissionsInput::default()
        })
        .await;
    let cursor = service
        .list_permissions(ListPermissionsInput {
            cursor: Some("%%%".to_owned()),
            ..ListPermissionsInput::default()
        })
        .await;

    assert!(matches!(zero, Err(AppError::Validation(_))));
    assert!(matches!(cursor, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn list_permissions_caps_limit() {
    let page = service()
        .list_permissions(ListPermissionsInput {
            limit: Some(500),
            ..ListPermissionsInput::default()
        })
        .await;

    assert!(matches!(page, Ok(ref value) if value.limit == 100));
}
