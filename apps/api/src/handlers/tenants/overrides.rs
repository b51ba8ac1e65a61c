use super::*;

pub async fn list_overrides_handler(
    State(state): State<AppState>,
    Path((raw_tenant_id, raw_user_id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<OverrideResponse>>> {
    let overrides = state
        .override_service
        .list_overrides(&tenant_id(raw_tenant_id)?, &user_id(raw_user_id)?)
        .await?
        .into_iter()
        .map(OverrideResponse::from)
        .collect();

    Ok(Json(overrides))
}

pub async fn allow_permission_handler(
    State(state): State<AppState>,
    Path((raw_tenant_id, raw_user_id)): Path<(String, String)>,
    Json(payload): Json<SetOverrideRequest>,
) -> ApiResult<Json<OverrideWriteResponse>> {
    set_override(
        state,
        raw_tenant_id,
        raw_user_id,
        payload,
        OverrideEffect::Allow,
    )
    .await
}

pub async fn deny_permission_handler(
    State(state): State<AppState>,
    Path((raw_tenant_id, raw_user_id)): Path<(String, String)>,
    Json(payload): Json<SetOverrideRequest>,
) -> ApiResult<Json<OverrideWriteResponse>> {
    set_override(
        state,
        raw_tenant_id,
        raw_user_id,
        payload,
        OverrideEffect::Deny,
    )
    .await
}

pub async fn remove_override_handler(
    State(state): State<AppState>,
    Path((raw_tenant_id, raw_user_id, raw_permission_id)): Path<(String, String, String)>,
) -> ApiResult<Json<OverrideRemovalResponse>> {
    let removal = state
        .override_service
        .remove_override(
            &tenant_id(raw_tenant_id)?,
            &user_id(raw_user_id)?,
            &permission_id(raw_permission_id)?,
        )
        .await?;

    Ok(Json(OverrideRemovalResponse::from(removal)))
}

async fn set_override(
    state: AppState,
    raw_tenant_id: String,
    raw_user_id: String,
    payload: SetOverrideRequest,
    effect: OverrideEffect,
) -> ApiResult<Json<OverrideWriteResponse>> {
    let write = state
        .override_service
        .set_override(
            &tenant_id(raw_tenant_id)?,
            &user_id(raw_user_id)?,
            &permission_id(payload.permission_id)?,
            effect,
            payload.reason,
        )
        .await?;

    Ok(Json(OverrideWriteResponse::from(write)))
}
