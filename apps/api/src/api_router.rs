use axum::Router;
use axum::routing::{delete, get, patch, post};
use tenantry_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::handlers::tenants;
use crate::state::AppState;

mod cors;


pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let permission_routes = Router::new()
        .route(
            "/api/permissions",
            get(handlers::permissions::list_permissions_handler)
                .post(handlers::permissions::create_permission_handler),
        )
        .route(
            "/api/permissions/{permission_id}",
            get(handlers::permissions::get_permission_handler),
        )
        .route(
            "/api/permissions/{permission_id}/deprecate",
            post(handlers::permissions::deprecate_permission_handler),
        );

    let tenant_routes = Router::new()
        .route(
            "/api/tenants/{tenant_id}/roles",
            get(tenants::list_roles_handler).post(tenants::create_role_handler),
        )
        .route(
            "/api/tenants/{tenant_id}/roles/{role_id}/permissions",
            patch(tenants::update_role_permissions_handler),
        )
        .route(
            "/api/tenants/{tenant_id}/users",
            post(tenants::add_member_handler),
        )
        .route(
            "/api/tenants/{tenant_id}/invitations",
            post(tenants::invite_member_handler),
        )
        .route(
            "/api/tenants/{tenant_id}/users/{user_id}",
            get(tenants::get_membership_handler),
        )
        .route(
            "/api/tenants/{tenant_id}/users/{user_id}/activate",
            post(tenants::activate_membership_handler),
        )
        .route(
            "/api/tenants/{tenant_id}/users/{user_id}/roles",
            patch(tenants::update_membership_roles_handler),
        )
        .route(
            "/api/tenants/{tenant_id}/users/{user_id}/suspend",
            post(tenants::suspend_membership_handler),
        )
        .route(
            "/api/tenants/{tenant_id}/users/{user_id}/unsuspend",
            post(tenants::unsuspend_membership_handler),
        )
        .route(
            "/api/tenants/{tenant_id}/users/{user_id}/permissions",
            get(tenants::list_overrides_handler),
        )
        .route(
            "/api/tenants/{tenant_id}/users/{user_id}/permissions/allow",
            post(tenants::allow_permission_handler),
        )
        .route(
            "/api/tenants/{tenant_id}/users/{user_id}/permissions/deny",
            post(tenants::deny_permission_handler),
        )
        .route(
            "/api/tenants/{tenant_id}/users/{user_id}/permissions/{permission_id}",
            delete(tenants::remove_override_handler),
        )
        .route(
            "/api/tenants/{tenant_id}/users/{user_id}/effective-permissions",
            get(tenants::effective_permissions_handler),
        )
        .route(
            "/api/tenants/{tenant_id}/users/{user_id}/effective-permissions/{permission_id}",
            get(tenants::permission_decision_handler),
        );

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(permission_routes)
        .merge(tenant_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
