use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::models::company::CompanyProfile;
use crate::models::job_seeker::JobSeekerProfile;
use crate::models::user::User;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterJobSeekerPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterCompanyPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub company_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    pub user_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordPayload {
    #[validate(email)]
    pub email: String,
    pub user_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordPayload {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

/// Partial profile update. Only supplied fields are written; the rest keep
/// their stored values. Job-seeker and company fields share one payload
/// since the route dispatches on the authenticated user's type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfilePayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub desired_job_title: Option<String>,
    pub experience_years: Option<i32>,
    pub skills: Option<Vec<String>>,
    pub self_introduction: Option<String>,
    pub interview_enabled: Option<bool>,
    #[validate(length(min = 1))]
    pub company_name: Option<String>,
    pub description: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

impl UpdateProfilePayload {
    pub fn skills_json(&self) -> Option<JsonValue> {
        self.skills.as_ref().map(|s| JsonValue::from(s.clone()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RejectCompanyPayload {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAdminPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeleteUserPayload {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileData {
    JobSeeker(JobSeekerProfile),
    Company(CompanyProfile),
}
