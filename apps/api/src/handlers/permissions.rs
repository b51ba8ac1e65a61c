use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tenantry_application::ListPermissionsInput;
use tenantry_domain::PermissionStatus;

use super::permission_id;
use crate::dto::{
    CreatePermissionRequest, ListPermissionsQuery, PermissionPageResponse, PermissionResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Query(query): Query<ListPermissionsQuery>,
) -> ApiResult<Json<PermissionPageResponse>> {
    let status = query
        .status
        .as_deref()
        .map(|value| PermissionStatus::from_str(value.trim().to_ascii_uppercase().as_str()))
        .transpose()?;

    let page = state
        .permission_registry_service
        .list_permissions(ListPermissionsInput {
            status,
            query: query.q,
            limit: query.limit,
            cursor: query.cursor,
        })
        .await?;

    Ok(Json(PermissionPageResponse::from(page)))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    let permission = state
        .permission_registry_service
        .create_permission(payload.key.as_str(), payload.description.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(PermissionResponse::from(permission))))
}

pub async fn get_permission_handler(
    State(state): State<AppState>,
    Path(raw_permission_id): Path<String>,
) -> ApiResult<Json<PermissionResponse>> {
    let permission = state
        .permission_registry_service
        .get_permission(&permission_id(raw_permission_id)?)
        .await?;

    Ok(Json(PermissionResponse::from(permission)))
}

pub async fn deprecate_permission_handler(
    State(state): State<AppState>,
    Path(raw_permission_id): Path<String>,
) -> ApiResult<Json<PermissionResponse>> {
    let permission = state
        .permission_registry_service
        .deprecate_permission(&permission_id(raw_permission_id)?)
        .await?;

    Ok(Json(PermissionResponse::from(permission)))
}
