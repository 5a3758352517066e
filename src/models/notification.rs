use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub mod notification_kind {
    pub const INFO: &str = "info";
    pub const SUCCESS: &str = "success";
    pub const WARNING: &str = "warning";
    pub const ERROR: &str = "error";

    pub fn is_valid(kind: &str) -> bool {
        matches!(kind, INFO | SUCCESS | WARNING | ERROR)
    }
}

pub mod target_mode {
    pub const ALL: &str = "all";
    pub const SELECTED: &str = "selected";
    pub const FILTERED: &str = "filtered";
}

/// One inbox message. The only state transition is unread -> read;
/// deletion is terminal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_read: bool,
    pub history_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Audit record of one spot broadcast. The generated notification ids are
/// recorded here, and the notifications also reference the history row so
/// edits and deletes fan out to exactly the rows the send produced.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SpotNotificationHistory {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub target_mode: String,
    pub notification_ids: Vec<Uuid>,
    pub recipient_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named, toggleable trigger rule ("on registration complete", ...)
/// with its own message template and send counter.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowNotificationHistory {
    pub id: Uuid,
    pub workflow_key: String,
    pub name: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub enabled: bool,
    pub sent_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub mod workflow_key {
    pub const REGISTRATION_COMPLETE: &str = "registration_complete";
    pub const PROFILE_COMPLETE: &str = "profile_complete";
}
