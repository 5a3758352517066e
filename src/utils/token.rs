use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sessions expire eight hours after login; there is no refresh mechanism.
pub const SESSION_TTL_HOURS: i64 = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub login_time: i64,
    pub exp: usize,
}

pub fn issue_session(
    secret: &str,
    user_id: Uuid,
    email: &str,
    role: &str,
    login_time: DateTime<Utc>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expires = login_time + Duration::hours(SESSION_TTL_HOURS);
    let claims = SessionClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        login_time: login_time.timestamp(),
        exp: expires.timestamp() as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_session(
    secret: &str,
    token: &str,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Freshness is checked against the recorded login time rather than `exp`
/// so that a stale-but-signed token is refused with the same 401 as a
/// malformed one.
pub fn session_is_fresh(login_time: i64, now: DateTime<Utc>) -> bool {
    now.timestamp() - login_time <= SESSION_TTL_HOURS * 3600
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn issue_then_decode_round_trip() {
        let user_id = Uuid::new_v4();
        let login = Utc::now();
        let token = issue_session(SECRET, user_id, "a@example.com", "job_seeker", login)
            .expect("issue");
        let claims = decode_session(SECRET, &token).expect("decode");
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.role, "job_seeker");
        assert_eq!(claims.login_time, login.timestamp());
    }

    #[test]
    fn decode_rejects_wrong_secret() {
        let token = issue_session(SECRET, Uuid::new_v4(), "a@example.com", "admin", Utc::now())
            .expect("issue");
        assert!(decode_session("other-secret", &token).is_err());
    }

    #[test]
    fn session_fresh_just_under_eight_hours() {
        let now = Utc::now();
        let login = now - Duration::hours(7) - Duration::minutes(59);
        assert!(session_is_fresh(login.timestamp(), now));
    }

    #[test]
    fn session_stale_past_eight_hours() {
        let now = Utc::now();
        let login = now - Duration::hours(8) - Duration::minutes(1);
        assert!(!session_is_fresh(login.timestamp(), now));
    }
}
