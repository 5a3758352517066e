use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::auth_dto::{CreateAdminPayload, DeleteUserPayload, RejectCompanyPayload},
    error::{Error, Result},
    middleware::auth::claims_from_headers,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/admin/companies/{user_id}/approve",
    params(("user_id" = Uuid, Path, description = "Company account id")),
    responses(
        (status = 200, description = "Company activated, credentials mailed"),
        (status = 404, description = "No pending company")
    )
)]
#[axum::debug_handler]
pub async fn approve_company(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user = state.auth_service.approve_company(user_id).await?;
    Ok(Json(json!({ "success": true, "data": user })))
}

#[utoipa::path(
    post,
    path = "/api/admin/companies/{user_id}/reject",
    params(("user_id" = Uuid, Path, description = "Company account id")),
    request_body = RejectCompanyPayload,
    responses(
        (status = 200, description = "Company rejected"),
        (status = 404, description = "No pending company")
    )
)]
#[axum::debug_handler]
pub async fn reject_company(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<RejectCompanyPayload>,
) -> Result<impl IntoResponse> {
    let user = state
        .auth_service
        .reject_company(user_id, payload.reason.as_deref())
        .await?;
    Ok(Json(json!({ "success": true, "data": user })))
}

/// Deliberately reachable without the admin layer: the configured primary
/// administrator address must be able to bootstrap itself on a fresh
/// deployment. Every other address requires an admin session.
#[utoipa::path(
    post,
    path = "/api/admin/admins",
    request_body = CreateAdminPayload,
    responses(
        (status = 201, description = "Admin account created"),
        (status = 403, description = "Not authorized to create this admin"),
        (status = 409, description = "Email already in use")
    )
)]
#[axum::debug_handler]
pub async fn create_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateAdminPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let caller_is_admin = claims_from_headers(&headers)
        .map(|claims| claims.role.eq_ignore_ascii_case("admin"))
        .unwrap_or(false);

    let user = state
        .auth_service
        .create_admin(&payload.email, payload.password.as_deref(), caller_is_admin)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": user })),
    ))
}

/// Shares the unlayered path with `create_admin`, so it re-checks the
/// session itself.
#[utoipa::path(
    get,
    path = "/api/admin/admins",
    responses(
        (status = 200, description = "All admin accounts"),
        (status = 403, description = "Admin session required")
    )
)]
#[axum::debug_handler]
pub async fn list_admins(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let claims = claims_from_headers(&headers)
        .map_err(|_| Error::Unauthorized("A valid session is required".to_string()))?;
    if !claims.role.eq_ignore_ascii_case("admin") {
        return Err(Error::Forbidden(
            "Administrator privileges required".to_string(),
        ));
    }

    let admins = state.auth_service.get_admins().await?;
    Ok(Json(json!({ "success": true, "data": admins })))
}

#[utoipa::path(
    delete,
    path = "/api/admin/admins/{id}",
    params(("id" = Uuid, Path, description = "Admin account id")),
    responses(
        (status = 200, description = "Admin deleted"),
        (status = 403, description = "The primary administrator cannot be deleted")
    )
)]
#[axum::debug_handler]
pub async fn delete_admin(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.auth_service.delete_admin(id).await?;
    Ok(Json(json!({ "success": true, "message": "Admin deleted." })))
}

#[utoipa::path(
    post,
    path = "/api/admin/admins/{id}/reset-password",
    params(("id" = Uuid, Path, description = "Admin account id")),
    responses(
        (status = 200, description = "New credential mailed"),
        (status = 404, description = "Admin not found")
    )
)]
#[axum::debug_handler]
pub async fn reset_admin_password(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.auth_service.reset_admin_password(id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "A new password has been sent by email."
    })))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users",
    request_body = DeleteUserPayload,
    responses(
        (status = 200, description = "Account and profile removed"),
        (status = 404, description = "No matching account")
    )
)]
#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Json(payload): Json<DeleteUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state.auth_service.delete_user_by_email(&payload.email).await?;
    Ok(Json(json!({ "success": true, "message": "Account deleted." })))
}

#[utoipa::path(
    get,
    path = "/api/admin/logs",
    responses((status = 200, description = "Most recent buffered log entries"))
)]
#[axum::debug_handler]
pub async fn get_logs(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let entries = state.log_buffer.recent(100);
    Ok(Json(json!({ "success": true, "data": entries })))
}
