use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::auth_dto::{
        ChangePasswordPayload, LoginPayload, LoginResponse, RegisterCompanyPayload,
        RegisterJobSeekerPayload, RegisterResponse, ResetPasswordPayload, UpdateProfilePayload,
    },
    error::{Error, Result},
    logging::buffer::LogLevel,
    middleware::auth::ensure_self_or_admin,
    models::notification::workflow_key,
    models::user::user_type,
    utils::token::SessionClaims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/register-jobseeker",
    request_body = RegisterJobSeekerPayload,
    responses(
        (status = 201, description = "Account created, credentials mailed", body = Json<RegisterResponse>),
        (status = 409, description = "Email already in use")
    )
)]
#[axum::debug_handler]
pub async fn register_jobseeker(
    State(state): State<AppState>,
    Json(payload): Json<RegisterJobSeekerPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let registered = state.auth_service.register_job_seeker(&payload).await?;

    if let Err(err) = state
        .notification_service
        .trigger_workflow(workflow_key::REGISTRATION_COMPLETE, registered.user.id)
        .await
    {
        state.log_buffer.record(
            LogLevel::Error,
            format!("registration workflow trigger failed: {}", err),
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "Registration complete. Login credentials have been sent by email."
                .to_string(),
            user: Some(registered.user),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/register-company",
    request_body = RegisterCompanyPayload,
    responses(
        (status = 201, description = "Company registered, pending approval", body = Json<RegisterResponse>),
        (status = 409, description = "Email already in use")
    )
)]
#[axum::debug_handler]
pub async fn register_company(
    State(state): State<AppState>,
    Json(payload): Json<RegisterCompanyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.auth_service.register_company(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "Registration received. You will be notified once an administrator reviews it."
                .to_string(),
            user: Some(user),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Session issued", body = Json<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let outcome = state
        .auth_service
        .login(
            &payload.email,
            &payload.password,
            payload.user_type.as_deref(),
        )
        .await?;

    match outcome {
        Some((user, token)) => Ok(Json(LoginResponse {
            success: true,
            user,
            token,
        })),
        None => Err(Error::Unauthorized(
            "Invalid email or password".to_string(),
        )),
    }
}

#[utoipa::path(
    post,
    path = "/api/reset-password",
    request_body = ResetPasswordPayload,
    responses(
        (status = 200, description = "New credential mailed"),
        (status = 404, description = "No matching account")
    )
)]
#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    if payload.user_type != user_type::JOB_SEEKER && payload.user_type != user_type::COMPANY {
        return Err(Error::BadRequest(format!(
            "Unknown user type: {}",
            payload.user_type
        )));
    }
    state
        .auth_service
        .reset_password(&payload.email, &payload.user_type)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "A new password has been sent by email."
    })))
}

#[utoipa::path(
    post,
    path = "/api/change-password",
    request_body = ChangePasswordPayload,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Current password incorrect")
    )
)]
#[axum::debug_handler]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = parse_subject(&claims)?;
    state
        .auth_service
        .change_password(user_id, &payload.current_password, &payload.new_password)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Password changed."
    })))
}

#[utoipa::path(
    get,
    path = "/api/profile/{user_id}",
    params(("user_id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Profile for the account"),
        (status = 404, description = "No profile")
    )
)]
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    ensure_self_or_admin(&claims, user_id)?;
    let profile = state.auth_service.get_profile(user_id).await?;
    Ok(Json(json!({ "success": true, "data": profile })))
}

#[utoipa::path(
    put,
    path = "/api/profile/{user_id}",
    params(("user_id" = Uuid, Path, description = "Account id")),
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Updated profile"),
        (status = 404, description = "Unknown account")
    )
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    ensure_self_or_admin(&claims, user_id)?;
    payload.validate()?;
    let update = state.auth_service.update_profile(user_id, &payload).await?;

    if update.newly_completed {
        if let Err(err) = state
            .notification_service
            .trigger_workflow(workflow_key::PROFILE_COMPLETE, user_id)
            .await
        {
            state.log_buffer.record(
                LogLevel::Error,
                format!("profile workflow trigger failed: {}", err),
            );
        }
    }

    Ok(Json(json!({ "success": true, "data": update.profile })))
}

fn parse_subject(claims: &SessionClaims) -> Result<Uuid> {
    claims
        .sub
        .parse()
        .map_err(|_| Error::Unauthorized("Invalid session subject".to_string()))
}
