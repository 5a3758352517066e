use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use uuid::Uuid;

use chrono::Utc;

use crate::error::Error;
use crate::utils::token::{decode_session, session_is_fresh, SessionClaims};

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"success": false, "message": message})),
    )
        .into_response()
}

/// Extracts and verifies the bearer session from the request headers.
/// A signed token whose login time is more than eight hours old is refused
/// the same way a malformed one is.
pub fn claims_from_headers(headers: &HeaderMap) -> Result<SessionClaims, Response> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Err(unauthorized("Missing Authorization header"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(unauthorized("Malformed Authorization header"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(unauthorized("Unsupported authorization scheme"));
    };

    let config = crate::config::get_config();
    let claims = match decode_session(&config.jwt_secret, token) {
        Ok(claims) => claims,
        Err(_) => return Err(unauthorized("Invalid session token")),
    };
    if !session_is_fresh(claims.login_time, Utc::now()) {
        return Err(unauthorized("Session expired"));
    }
    Ok(claims)
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    match claims_from_headers(req.headers()) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}

pub async fn require_admin(mut req: Request, next: Next) -> Response {
    match claims_from_headers(req.headers()) {
        Ok(claims) => {
            if !claims.role.eq_ignore_ascii_case("admin") {
                return (
                    StatusCode::FORBIDDEN,
                    Json(json!({"success": false, "message": "Administrator privileges required"})),
                )
                    .into_response();
            }
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}

/// Resource-ownership guard used by the per-user routes: a session may only
/// touch its own rows unless it carries the admin role.
pub fn ensure_self_or_admin(claims: &SessionClaims, user_id: Uuid) -> crate::error::Result<()> {
    if claims.role.eq_ignore_ascii_case("admin") || claims.sub == user_id.to_string() {
        Ok(())
    } else {
        Err(Error::Forbidden(
            "You may only access your own data".to_string(),
        ))
    }
}
