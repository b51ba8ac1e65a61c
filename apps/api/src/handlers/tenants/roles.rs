use super::*;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Path(raw_tenant_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<RolePageResponse>> {
    let page = state
        .role_service
        .list_roles(
            &tenant_id(raw_tenant_id)?,
            query.limit,
            query.cursor.as_deref(),
        )
        .await?;

    Ok(Json(RolePageResponse::from(page)))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Path(raw_tenant_id): Path<String>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .role_service
        .create_role(&tenant_id(raw_tenant_id)?, payload.name.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn update_role_permissions_handler(
    State(state): State<AppState>,
    Path((raw_tenant_id, raw_role_id)): Path<(String, String)>,
    Json(payload): Json<UpdateRolePermissionsRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_service
        .update_role_permissions(
            &tenant_id(raw_tenant_id)?,
            &role_id(raw_role_id)?,
            permission_ids(payload.add)?,
            permission_ids(payload.remove)?,
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}
