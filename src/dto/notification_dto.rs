use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

fn default_kind() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendToUserPayload {
    pub user_id: Uuid,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub message: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendToAllPayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub message: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

/// Filter criteria for `target_mode = "filtered"` spot sends, applied to
/// job-seeker profiles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotFilter {
    pub interview_enabled: Option<bool>,
    pub desired_job_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SpotSendPayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub message: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    pub target_mode: String,
    pub user_ids: Option<Vec<Uuid>>,
    pub filter: Option<SpotFilter>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateSpotPayload {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WorkflowPayload {
    #[validate(length(min = 1))]
    pub workflow_key: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub message: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}
