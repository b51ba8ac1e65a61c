use super::*;

pub async fn effective_permissions_handler(
    State(state): State<AppState>,
    Path((raw_tenant_id, raw_user_id)): Path<(String, String)>,
) -> ApiResult<Json<EffectivePermissionsResponse>> {
    let view = state
        .authorization_service
        .effective_permissions(&tenant_id(raw_tenant_id)?, &user_id(raw_user_id)?)
        .await?;

    Ok(Json(EffectivePermissionsResponse::from(view)))
}

pub async fn permission_decision_handler(
    State(state): State<AppState>,
    Path((raw_tenant_id, raw_user_id, raw_permission_id)): Path<(String, String, String)>,
) -> ApiResult<Json<PermissionDecisionResponse>> {
    let tenant_id = tenant_id(raw_tenant_id)?;
    let user_id = user_id(raw_user_id)?;
    let permission_id = permission_id(raw_permission_id)?;

    let decision = state
        .authorization_service
        .decide(&tenant_id, &user_id, &permission_id)
        .await?;

    Ok(Json(PermissionDecisionResponse {
        tenant_id: tenant_id.as_str().to_owned(),
        user_id: user_id.as_str().to_owned(),
        permission_id: permission_id.as_str().to_owned(),
        decision: decision.as_str().to_owned(),
    }))
}
