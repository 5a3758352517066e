use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::notification_dto::{
        SendToAllPayload, SendToUserPayload, SpotSendPayload, UpdateSpotPayload, WorkflowPayload,
    },
    error::Result,
    middleware::auth::ensure_self_or_admin,
    utils::token::SessionClaims,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/notifications/user/{user_id}",
    params(("user_id" = Uuid, Path, description = "Inbox owner")),
    responses((status = 200, description = "Notifications, newest first"))
)]
#[axum::debug_handler]
pub async fn list_user_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    ensure_self_or_admin(&claims, user_id)?;
    let notifications = state.notification_service.list_for_user(user_id).await?;
    Ok(Json(json!({ "success": true, "data": notifications })))
}

#[utoipa::path(
    get,
    path = "/api/notifications/unread-count/{user_id}",
    params(("user_id" = Uuid, Path, description = "Inbox owner")),
    responses((status = 200, description = "Unread notification count"))
)]
#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    ensure_self_or_admin(&claims, user_id)?;
    let count = state.notification_service.unread_count(user_id).await?;
    Ok(Json(json!({ "success": true, "data": { "count": count } })))
}

#[utoipa::path(
    put,
    path = "/api/notifications/mark-read/{notification_id}",
    params(("notification_id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked read"),
        (status = 404, description = "Notification not found")
    )
)]
#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let notification = state.notification_service.mark_read(notification_id).await?;
    Ok(Json(json!({ "success": true, "data": notification })))
}

#[utoipa::path(
    put,
    path = "/api/notifications/mark-all-read/{user_id}",
    params(("user_id" = Uuid, Path, description = "Inbox owner")),
    responses((status = 200, description = "Unread notifications marked read"))
)]
#[axum::debug_handler]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    ensure_self_or_admin(&claims, user_id)?;
    let updated = state.notification_service.mark_all_read(user_id).await?;
    Ok(Json(json!({ "success": true, "data": { "updated": updated } })))
}

#[utoipa::path(
    delete,
    path = "/api/notifications/{notification_id}",
    params(("notification_id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification deleted"),
        (status = 404, description = "Notification not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.notification_service.delete(notification_id).await?;
    Ok(Json(json!({ "success": true, "message": "Notification deleted." })))
}

#[utoipa::path(
    get,
    path = "/api/notifications/admin/all",
    responses((status = 200, description = "Every notification, newest first"))
)]
#[axum::debug_handler]
pub async fn list_all_notifications(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let notifications = state.notification_service.list_all().await?;
    Ok(Json(json!({ "success": true, "data": notifications })))
}

#[utoipa::path(
    post,
    path = "/api/notifications/admin/send-to-user",
    request_body = SendToUserPayload,
    responses((status = 200, description = "Notification delivered to the user"))
)]
#[axum::debug_handler]
pub async fn send_to_user(
    State(state): State<AppState>,
    Json(payload): Json<SendToUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let notification = state.notification_service.send_to_user(&payload).await?;
    Ok(Json(json!({ "success": true, "data": notification })))
}

#[utoipa::path(
    post,
    path = "/api/notifications/admin/send-to-all",
    request_body = SendToAllPayload,
    responses((status = 200, description = "Notification delivered to every job seeker"))
)]
#[axum::debug_handler]
pub async fn send_to_all(
    State(state): State<AppState>,
    Json(payload): Json<SendToAllPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let sent = state
        .notification_service
        .send_to_all(&payload.title, &payload.message, &payload.kind)
        .await?;
    Ok(Json(json!({ "success": true, "data": { "sent": sent } })))
}

#[utoipa::path(
    post,
    path = "/api/notifications/admin/send-spot",
    request_body = SpotSendPayload,
    responses((status = 200, description = "Spot broadcast recorded and delivered"))
)]
#[axum::debug_handler]
pub async fn send_spot(
    State(state): State<AppState>,
    Json(payload): Json<SpotSendPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let history = state.notification_service.send_spot(&payload).await?;
    Ok(Json(json!({ "success": true, "data": history })))
}

#[utoipa::path(
    post,
    path = "/api/notifications/admin/workflow",
    request_body = WorkflowPayload,
    responses((status = 200, description = "Workflow rule saved"))
)]
#[axum::debug_handler]
pub async fn upsert_workflow(
    State(state): State<AppState>,
    Json(payload): Json<WorkflowPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let workflow = state.notification_service.upsert_workflow(&payload).await?;
    Ok(Json(json!({ "success": true, "data": workflow })))
}

#[utoipa::path(
    get,
    path = "/api/notifications/admin/spot-history",
    responses((status = 200, description = "Spot broadcast audit records"))
)]
#[axum::debug_handler]
pub async fn spot_history(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let history = state.notification_service.list_spot_history().await?;
    Ok(Json(json!({ "success": true, "data": history })))
}

#[utoipa::path(
    get,
    path = "/api/notifications/admin/workflow-history",
    responses((status = 200, description = "Workflow rules with send counters"))
)]
#[axum::debug_handler]
pub async fn workflow_history(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let workflows = state.notification_service.list_workflows().await?;
    Ok(Json(json!({ "success": true, "data": workflows })))
}

#[utoipa::path(
    put,
    path = "/api/notifications/admin/spot/{id}",
    params(("id" = Uuid, Path, description = "Spot history id")),
    request_body = UpdateSpotPayload,
    responses(
        (status = 200, description = "History and delivered notifications updated"),
        (status = 404, description = "Spot history not found")
    )
)]
#[axum::debug_handler]
pub async fn update_spot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSpotPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let history = state
        .notification_service
        .update_by_history_id(id, &payload)
        .await?;
    Ok(Json(json!({ "success": true, "data": history })))
}

#[utoipa::path(
    delete,
    path = "/api/notifications/admin/spot/{id}",
    params(("id" = Uuid, Path, description = "Spot history id")),
    responses(
        (status = 200, description = "History and delivered notifications removed"),
        (status = 404, description = "Spot history not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_spot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let removed = state.notification_service.delete_by_history_id(id).await?;
    Ok(Json(json!({ "success": true, "data": { "removed": removed } })))
}
