use crate::dto::auth_dto::{
    ProfileData, RegisterCompanyPayload, RegisterJobSeekerPayload, UpdateProfilePayload,
};
use crate::error::{Error, Result};
use crate::models::company::CompanyProfile;
use crate::models::job_seeker::JobSeekerProfile;
use crate::models::user::{user_status, user_type, User};
use crate::services::email_service::EmailService;
use crate::utils::crypto::{generate_password, hash_password, verify_password};
use crate::utils::token::issue_session;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Shown verbatim to the registrant; the UI renders it as-is.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "このメールアドレスはすでに使われています";

const USER_COLUMNS: &str = "id, email, password_hash, user_type, status, created_at, updated_at";
const JOB_SEEKER_COLUMNS: &str = "user_id, first_name, last_name, phone, desired_job_title, \
     experience_years, skills, self_introduction, interview_enabled, created_at, updated_at";
const COMPANY_COLUMNS: &str =
    "user_id, company_name, description, contact_email, contact_phone, created_at, updated_at";

pub struct RegisteredJobSeeker {
    pub user: User,
    pub plaintext_password: String,
}

pub struct ProfileUpdate {
    pub profile: ProfileData,
    pub newly_completed: bool,
}

/// Account CRUD and credential verification. Mail sends are best-effort:
/// a failed delivery is logged and never rolls back the operation.
#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    email: EmailService,
    admin_email: String,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(pool: PgPool, email: EmailService, admin_email: String, jwt_secret: String) -> Self {
        Self {
            pool,
            email,
            admin_email,
            jwt_secret,
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Creates an active job-seeker account with a generated credential and
    /// a skeleton profile, in one transaction. The plaintext password is
    /// returned for one-time delivery and never persisted.
    pub async fn register_job_seeker(
        &self,
        payload: &RegisterJobSeekerPayload,
    ) -> Result<RegisteredJobSeeker> {
        if self.get_user_by_email(&payload.email).await?.is_some() {
            return Err(Error::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string()));
        }

        let password = generate_password();
        let password_hash =
            hash_password(&password).map_err(|e| Error::Internal(e.to_string()))?;

        let mut tx = self.pool.begin().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, user_type, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&payload.email)
        .bind(&password_hash)
        .bind(user_type::JOB_SEEKER)
        .bind(user_status::ACTIVE)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_duplicate_email)?;

        sqlx::query("INSERT INTO job_seekers (user_id, first_name, last_name) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(&payload.first_name)
            .bind(&payload.last_name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if !self
            .email
            .send_credentials(&user.email, &password, payload.language.as_deref())
            .await
        {
            tracing::warn!(email = %user.email, "credential mail not delivered");
        }

        Ok(RegisteredJobSeeker {
            user,
            plaintext_password: password,
        })
    }

    /// Company accounts start pending with no password; the credential is
    /// only issued on admin approval.
    pub async fn register_company(&self, payload: &RegisterCompanyPayload) -> Result<User> {
        if self.get_user_by_email(&payload.email).await?.is_some() {
            return Err(Error::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string()));
        }

        let mut tx = self.pool.begin().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, user_type, status)
             VALUES ($1, $2, $3)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&payload.email)
        .bind(user_type::COMPANY)
        .bind(user_status::PENDING)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_duplicate_email)?;

        sqlx::query("INSERT INTO companies (user_id, company_name, description) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(&payload.company_name)
            .bind(&payload.description)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if !self.email.send_company_received(&user.email).await {
            tracing::warn!(email = %user.email, "company registration mail not delivered");
        }
        if !self
            .email
            .send_admin_company_registered(&self.admin_email, &payload.company_name, &user.email)
            .await
        {
            tracing::warn!("admin notification mail not delivered");
        }

        Ok(user)
    }

    /// Returns `None` for every expected failure: unknown email, wrong user
    /// type, an account with no credential yet, or a bad password. Only
    /// infrastructure problems surface as errors.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        expected_type: Option<&str>,
    ) -> Result<Option<(User, String)>> {
        let Some(user) = self.get_user_by_email(email).await? else {
            return Ok(None);
        };
        if let Some(expected) = expected_type {
            if user.user_type != expected {
                return Ok(None);
            }
        }
        let Some(hash) = user.password_hash.as_deref() else {
            return Ok(None);
        };
        if !verify_password(password, hash).map_err(|e| Error::Internal(e.to_string()))? {
            return Ok(None);
        }

        let token = issue_session(
            &self.jwt_secret,
            user.id,
            &user.email,
            &user.user_type,
            Utc::now(),
        )
        .map_err(|e| Error::Internal(e.to_string()))?;
        Ok(Some((user, token)))
    }

    /// pending -> active, issuing the company's first credential. Repeat
    /// calls find no pending row and fail, keeping terminal states stable.
    pub async fn approve_company(&self, user_id: Uuid) -> Result<User> {
        let password = generate_password();
        let password_hash =
            hash_password(&password).map_err(|e| Error::Internal(e.to_string()))?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET status = $1, password_hash = $2, updated_at = NOW()
             WHERE id = $3 AND user_type = $4 AND status = $5
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_status::ACTIVE)
        .bind(&password_hash)
        .bind(user_id)
        .bind(user_type::COMPANY)
        .bind(user_status::PENDING)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("No pending company for this id".to_string()))?;

        if !self.email.send_credentials(&user.email, &password, None).await {
            tracing::warn!(email = %user.email, "approval mail not delivered");
        }
        Ok(user)
    }

    pub async fn reject_company(&self, user_id: Uuid, reason: Option<&str>) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET status = $1, updated_at = NOW()
             WHERE id = $2 AND user_type = $3 AND status = $4
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_status::REJECTED)
        .bind(user_id)
        .bind(user_type::COMPANY)
        .bind(user_status::PENDING)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("No pending company for this id".to_string()))?;

        if !self.email.send_company_rejected(&user.email, reason).await {
            tracing::warn!(email = %user.email, "rejection mail not delivered");
        }
        Ok(user)
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let user = self
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Account not found".to_string()))?;
        let Some(hash) = user.password_hash.as_deref() else {
            return Err(Error::Unauthorized("No password is set for this account".to_string()));
        };
        if !verify_password(current_password, hash).map_err(|e| Error::Internal(e.to_string()))? {
            return Err(Error::Unauthorized("Current password is incorrect".to_string()));
        }

        let new_hash = hash_password(new_password).map_err(|e| Error::Internal(e.to_string()))?;
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(&new_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if !self.email.send_password_changed(&user.email).await {
            tracing::warn!(email = %user.email, "password change notice not delivered");
        }
        Ok(())
    }

    /// Replaces the credential of an existing account of the given type and
    /// mails the new one. Used for job-seeker and company self-service
    /// resets.
    pub async fn reset_password(&self, email: &str, expected_type: &str) -> Result<()> {
        let user = self
            .get_user_by_email(email)
            .await?
            .filter(|u| u.user_type == expected_type)
            .ok_or_else(|| Error::NotFound("Account not found".to_string()))?;
        self.issue_new_credential(&user).await
    }

    pub async fn reset_admin_password(&self, id: Uuid) -> Result<()> {
        let user = self
            .get_user_by_id(id)
            .await?
            .filter(|u| u.is_admin())
            .ok_or_else(|| Error::NotFound("Admin not found".to_string()))?;
        self.issue_new_credential(&user).await
    }

    async fn issue_new_credential(&self, user: &User) -> Result<()> {
        let password = generate_password();
        let password_hash =
            hash_password(&password).map_err(|e| Error::Internal(e.to_string()))?;
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(&password_hash)
            .bind(user.id)
            .execute(&self.pool)
            .await?;

        if !self.email.send_credentials(&user.email, &password, None).await {
            tracing::warn!(email = %user.email, "reset credential mail not delivered");
        }
        Ok(())
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<ProfileData> {
        let user = self
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Account not found".to_string()))?;

        match user.user_type.as_str() {
            user_type::JOB_SEEKER => {
                let profile = self
                    .job_seeker_profile(user_id)
                    .await?
                    .ok_or_else(|| Error::NotFound("Profile not found".to_string()))?;
                Ok(ProfileData::JobSeeker(profile))
            }
            user_type::COMPANY => {
                let profile = sqlx::query_as::<_, CompanyProfile>(&format!(
                    "SELECT {} FROM companies WHERE user_id = $1",
                    COMPANY_COLUMNS
                ))
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| Error::NotFound("Profile not found".to_string()))?;
                Ok(ProfileData::Company(profile))
            }
            _ => Err(Error::NotFound("This account has no profile".to_string())),
        }
    }

    /// Upsert with partial-update semantics: omitted fields keep their
    /// stored values via COALESCE. Reports whether a job-seeker profile
    /// crossed into "complete" with this write so the caller can fire the
    /// completion workflow exactly once.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        payload: &UpdateProfilePayload,
    ) -> Result<ProfileUpdate> {
        let user = self
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Account not found".to_string()))?;

        match user.user_type.as_str() {
            user_type::JOB_SEEKER => {
                let was_complete = self
                    .job_seeker_profile(user_id)
                    .await?
                    .is_some_and(|p| p.is_complete());

                let profile = sqlx::query_as::<_, JobSeekerProfile>(&format!(
                    "INSERT INTO job_seekers
                         (user_id, first_name, last_name, phone, desired_job_title,
                          experience_years, skills, self_introduction, interview_enabled)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, FALSE))
                     ON CONFLICT (user_id) DO UPDATE SET
                         first_name = COALESCE($2, job_seekers.first_name),
                         last_name = COALESCE($3, job_seekers.last_name),
                         phone = COALESCE($4, job_seekers.phone),
                         desired_job_title = COALESCE($5, job_seekers.desired_job_title),
                         experience_years = COALESCE($6, job_seekers.experience_years),
                         skills = COALESCE($7, job_seekers.skills),
                         self_introduction = COALESCE($8, job_seekers.self_introduction),
                         interview_enabled = COALESCE($9, job_seekers.interview_enabled),
                         updated_at = NOW()
                     RETURNING {}",
                    JOB_SEEKER_COLUMNS
                ))
                .bind(user_id)
                .bind(&payload.first_name)
                .bind(&payload.last_name)
                .bind(&payload.phone)
                .bind(&payload.desired_job_title)
                .bind(payload.experience_years)
                .bind(payload.skills_json())
                .bind(&payload.self_introduction)
                .bind(payload.interview_enabled)
                .fetch_one(&self.pool)
                .await?;

                let newly_completed = !was_complete && profile.is_complete();
                Ok(ProfileUpdate {
                    profile: ProfileData::JobSeeker(profile),
                    newly_completed,
                })
            }
            user_type::COMPANY => {
                let profile = sqlx::query_as::<_, CompanyProfile>(&format!(
                    "INSERT INTO companies
                         (user_id, company_name, description, contact_email, contact_phone)
                     VALUES ($1, $2, $3, $4, $5)
                     ON CONFLICT (user_id) DO UPDATE SET
                         company_name = COALESCE($2, companies.company_name),
                         description = COALESCE($3, companies.description),
                         contact_email = COALESCE($4, companies.contact_email),
                         contact_phone = COALESCE($5, companies.contact_phone),
                         updated_at = NOW()
                     RETURNING {}",
                    COMPANY_COLUMNS
                ))
                .bind(user_id)
                .bind(&payload.company_name)
                .bind(&payload.description)
                .bind(&payload.contact_email)
                .bind(&payload.contact_phone)
                .fetch_one(&self.pool)
                .await?;

                Ok(ProfileUpdate {
                    profile: ProfileData::Company(profile),
                    newly_completed: false,
                })
            }
            _ => Err(Error::BadRequest("This account has no profile".to_string())),
        }
    }

    /// Profile row first, then the user row, in one transaction; a failure
    /// midway rolls back both.
    pub async fn delete_user_by_email(&self, email: &str) -> Result<()> {
        let user = self
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| Error::NotFound("Account not found".to_string()))?;
        if user.email == self.admin_email {
            return Err(Error::Forbidden(
                "The primary administrator account cannot be deleted".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        match user.user_type.as_str() {
            user_type::JOB_SEEKER => {
                sqlx::query("DELETE FROM job_seekers WHERE user_id = $1")
                    .bind(user.id)
                    .execute(&mut *tx)
                    .await?;
            }
            user_type::COMPANY => {
                sqlx::query("DELETE FROM companies WHERE user_id = $1")
                    .bind(user.id)
                    .execute(&mut *tx)
                    .await?;
            }
            _ => {}
        }
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Admin bootstrap rule: without an admin session, only the configured
    /// primary administrator address may be created.
    pub async fn create_admin(
        &self,
        email: &str,
        password: Option<&str>,
        caller_is_admin: bool,
    ) -> Result<User> {
        if !caller_is_admin && email != self.admin_email {
            return Err(Error::Forbidden(
                "Only the primary administrator account can be bootstrapped".to_string(),
            ));
        }

        if let Some(existing) = self.get_user_by_email(email).await? {
            if existing.is_admin() {
                return Err(Error::Conflict("This email is already an admin".to_string()));
            }
            return Err(Error::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string()));
        }

        let generated;
        let plaintext = match password {
            Some(p) => p,
            None => {
                generated = generate_password();
                generated.as_str()
            }
        };
        let password_hash =
            hash_password(plaintext).map_err(|e| Error::Internal(e.to_string()))?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, user_type, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(&password_hash)
        .bind(user_type::ADMIN)
        .bind(user_status::ACTIVE)
        .fetch_one(&self.pool)
        .await
        .map_err(map_duplicate_email)?;

        if password.is_none() && !self.email.send_credentials(&user.email, plaintext, None).await {
            tracing::warn!(email = %user.email, "admin credential mail not delivered");
        }
        Ok(user)
    }

    pub async fn get_admins(&self) -> Result<Vec<User>> {
        let admins = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE user_type = $1 ORDER BY created_at ASC",
            USER_COLUMNS
        ))
        .bind(user_type::ADMIN)
        .fetch_all(&self.pool)
        .await?;
        Ok(admins)
    }

    pub async fn delete_admin(&self, id: Uuid) -> Result<()> {
        let user = self
            .get_user_by_id(id)
            .await?
            .filter(|u| u.is_admin())
            .ok_or_else(|| Error::NotFound("Admin not found".to_string()))?;
        if user.email == self.admin_email {
            return Err(Error::Forbidden(
                "The primary administrator account cannot be deleted".to_string(),
            ));
        }
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn job_seeker_profile(&self, user_id: Uuid) -> Result<Option<JobSeekerProfile>> {
        let profile = sqlx::query_as::<_, JobSeekerProfile>(&format!(
            "SELECT {} FROM job_seekers WHERE user_id = $1",
            JOB_SEEKER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }
}

/// Two registrations racing past the duplicate check land on the unique
/// index; surface the same friendly message as the up-front check.
fn map_duplicate_email(err: sqlx::Error) -> Error {
    let mapped = Error::from(err);
    if mapped.is_unique_violation() {
        Error::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string())
    } else {
        mapped
    }
}
