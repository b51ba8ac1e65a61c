use super::*;

pub async fn add_member_handler(
    State(state): State<AppState>,
    Path(raw_tenant_id): Path<String>,
    Json(payload): Json<MemberRequest>,
) -> ApiResult<(StatusCode, Json<MembershipResponse>)> {
    let membership = state
        .membership_service
        .add_member(
            &tenant_id(raw_tenant_id)?,
            &user_id(payload.user_id)?,
            optional_timestamp("expires_at", payload.expires_at)?,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(MembershipResponse::from(membership))))
}

pub async fn invite_member_handler(
    State(state): State<AppState>,
    Path(raw_tenant_id): Path<String>,
    Json(payload): Json<MemberRequest>,
) -> ApiResult<(StatusCode, Json<MembershipResponse>)> {
    let membership = state
        .membership_service
        .invite_member(
            &tenant_id(raw_tenant_id)?,
            &user_id(payload.user_id)?,
            optional_timestamp("expires_at", payload.expires_at)?,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(MembershipResponse::from(membership))))
}

pub async fn get_membership_handler(
    State(state): State<AppState>,
    Path((raw_tenant_id, raw_user_id)): Path<(String, String)>,
) -> ApiResult<Json<MembershipResponse>> {
    let membership = state
        .membership_service
        .get_membership(&tenant_id(raw_tenant_id)?, &user_id(raw_user_id)?)
        .await?;

    Ok(Json(MembershipResponse::from(membership)))
}

pub async fn activate_membership_handler(
    State(state): State<AppState>,
    Path((raw_tenant_id, raw_user_id)): Path<(String, String)>,
) -> ApiResult<Json<MembershipResponse>> {
    let membership = state
        .membership_service
        .activate_membership(&tenant_id(raw_tenant_id)?, &user_id(raw_user_id)?)
        .await?;

    Ok(Json(MembershipResponse::from(membership)))
}

pub async fn update_membership_roles_handler(
    State(state): State<AppState>,
    Path((raw_tenant_id, raw_user_id)): Path<(String, String)>,
    Json(payload): Json<UpdateMembershipRolesRequest>,
) -> ApiResult<Json<MembershipResponse>> {
    let membership = state
        .membership_service
        .update_membership_roles(
            &tenant_id(raw_tenant_id)?,
            &user_id(raw_user_id)?,
            role_ids(payload.add)?,
            role_ids(payload.remove)?,
        )
        .await?;

    Ok(Json(MembershipResponse::from(membership)))
}

pub async fn suspend_membership_handler(
    State(state): State<AppState>,
    Path((raw_tenant_id, raw_user_id)): Path<(String, String)>,
) -> ApiResult<Json<MembershipResponse>> {
    let membership = state
        .membership_service
        .suspend_membership(&tenant_id(raw_tenant_id)?, &user_id(raw_user_id)?)
        .await?;

    Ok(Json(MembershipResponse::from(membership)))
}

pub async fn unsuspend_membership_handler(
    State(state): State<AppState>,
    Path((raw_tenant_id, raw_user_id)): Path<(String, String)>,
) -> ApiResult<Json<MembershipResponse>> {
    let membership = state
        .membership_service
        .unsuspend_membership(&tenant_id(raw_tenant_id)?, &user_id(raw_user_id)?)
        .await?;

    Ok(Json(MembershipResponse::from(membership)))
}
