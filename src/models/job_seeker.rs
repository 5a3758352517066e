use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobSeekerProfile {
    pub user_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub desired_job_title: Option<String>,
    pub experience_years: Option<i32>,
    pub skills: Option<JsonValue>,
    pub self_introduction: Option<String>,
    pub interview_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobSeekerProfile {
    /// A profile counts as complete once the name, desired title and
    /// introduction have all been filled in.
    pub fn is_complete(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        filled(&self.first_name)
            && filled(&self.last_name)
            && filled(&self.desired_job_title)
            && filled(&self.self_introduction)
    }
}
