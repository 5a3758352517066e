use crate::dto::notification_dto::{
    SendToUserPayload, SpotSendPayload, UpdateSpotPayload, WorkflowPayload,
};
use crate::error::{Error, Result};
use crate::models::notification::{
    notification_kind, target_mode, Notification, SpotNotificationHistory,
    WorkflowNotificationHistory,
};
use crate::models::user::user_type;
use sqlx::PgPool;
use uuid::Uuid;

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, title, message, kind, is_read, history_id, created_at, updated_at";
const SPOT_COLUMNS: &str = "id, title, message, kind, target_mode, notification_ids, \
     recipient_count, created_at, updated_at";
const WORKFLOW_COLUMNS: &str = "id, workflow_key, name, title, message, kind, enabled, \
     sent_count, created_at, updated_at";

#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        kind: &str,
        history_id: Option<Uuid>,
    ) -> Result<Notification> {
        if !notification_kind::is_valid(kind) {
            return Err(Error::BadRequest(format!(
                "Unknown notification type: {}",
                kind
            )));
        }
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notifications (user_id, title, message, kind, history_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(title)
        .bind(message)
        .bind(kind)
        .bind(history_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(notification)
    }

    pub async fn send_to_user(&self, payload: &SendToUserPayload) -> Result<Notification> {
        self.create(
            payload.user_id,
            &payload.title,
            &payload.message,
            &payload.kind,
            None,
        )
        .await
    }

    /// One insert per job seeker, sequentially. Linear in user count; the
    /// expected audience size makes a batched insert not worth the trouble.
    pub async fn send_to_all(&self, title: &str, message: &str, kind: &str) -> Result<u64> {
        let user_ids = self.job_seeker_ids().await?;
        let mut sent = 0u64;
        for user_id in user_ids {
            self.create(user_id, title, message, kind, None).await?;
            sent += 1;
        }
        Ok(sent)
    }

    /// One-off broadcast to a chosen audience. The history row is written
    /// first so every generated notification can reference it, then updated
    /// with the generated ids and recipient count.
    pub async fn send_spot(&self, payload: &SpotSendPayload) -> Result<SpotNotificationHistory> {
        let targets = self.resolve_targets(payload).await?;

        let history = sqlx::query_as::<_, SpotNotificationHistory>(&format!(
            "INSERT INTO spot_notification_history (title, message, kind, target_mode)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            SPOT_COLUMNS
        ))
        .bind(&payload.title)
        .bind(&payload.message)
        .bind(&payload.kind)
        .bind(&payload.target_mode)
        .fetch_one(&self.pool)
        .await?;

        let mut notification_ids = Vec::with_capacity(targets.len());
        for user_id in targets {
            let notification = self
                .create(
                    user_id,
                    &payload.title,
                    &payload.message,
                    &payload.kind,
                    Some(history.id),
                )
                .await?;
            notification_ids.push(notification.id);
        }

        let history = sqlx::query_as::<_, SpotNotificationHistory>(&format!(
            "UPDATE spot_notification_history
             SET notification_ids = $1, recipient_count = $2, updated_at = NOW()
             WHERE id = $3
             RETURNING {}",
            SPOT_COLUMNS
        ))
        .bind(&notification_ids)
        .bind(notification_ids.len() as i32)
        .bind(history.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(history)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    pub async fn list_all(&self) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {} FROM notifications ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Idempotent: marking an already-read notification is a no-op success.
    pub async fn mark_read(&self, id: Uuid) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "UPDATE notifications SET is_read = TRUE, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            NOTIFICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Notification not found".to_string()))?;
        Ok(notification)
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, updated_at = NOW()
             WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Notification not found".to_string()));
        }
        Ok(())
    }

    pub async fn list_spot_history(&self) -> Result<Vec<SpotNotificationHistory>> {
        let history = sqlx::query_as::<_, SpotNotificationHistory>(&format!(
            "SELECT {} FROM spot_notification_history ORDER BY created_at DESC",
            SPOT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(history)
    }

    /// Re-edits every notification the spot send produced, then the history
    /// row itself, so inboxes and the audit record stay in step.
    pub async fn update_by_history_id(
        &self,
        history_id: Uuid,
        payload: &UpdateSpotPayload,
    ) -> Result<SpotNotificationHistory> {
        if let Some(kind) = payload.kind.as_deref() {
            if !notification_kind::is_valid(kind) {
                return Err(Error::BadRequest(format!(
                    "Unknown notification type: {}",
                    kind
                )));
            }
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE notifications
             SET title = COALESCE($2, title),
                 message = COALESCE($3, message),
                 kind = COALESCE($4, kind),
                 updated_at = NOW()
             WHERE history_id = $1",
        )
        .bind(history_id)
        .bind(&payload.title)
        .bind(&payload.message)
        .bind(&payload.kind)
        .execute(&mut *tx)
        .await?;

        let history = sqlx::query_as::<_, SpotNotificationHistory>(&format!(
            "UPDATE spot_notification_history
             SET title = COALESCE($2, title),
                 message = COALESCE($3, message),
                 kind = COALESCE($4, kind),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            SPOT_COLUMNS
        ))
        .bind(history_id)
        .bind(&payload.title)
        .bind(&payload.message)
        .bind(&payload.kind)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Spot history not found".to_string()))?;
        tx.commit().await?;
        Ok(history)
    }

    /// Removes the history record and, through the history reference,
    /// exactly the notifications that send produced. Returns how many
    /// inbox rows went with it.
    pub async fn delete_by_history_id(&self, history_id: Uuid) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE history_id = $1",
        )
        .bind(history_id)
        .fetch_one(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM spot_notification_history WHERE id = $1")
            .bind(history_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Spot history not found".to_string()));
        }
        tx.commit().await?;
        Ok(removed as u64)
    }

    pub async fn upsert_workflow(
        &self,
        payload: &WorkflowPayload,
    ) -> Result<WorkflowNotificationHistory> {
        if !notification_kind::is_valid(&payload.kind) {
            return Err(Error::BadRequest(format!(
                "Unknown notification type: {}",
                payload.kind
            )));
        }
        let workflow = sqlx::query_as::<_, WorkflowNotificationHistory>(&format!(
            "INSERT INTO workflow_notification_history
                 (workflow_key, name, title, message, kind, enabled)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (workflow_key) DO UPDATE SET
                 name = EXCLUDED.name,
                 title = EXCLUDED.title,
                 message = EXCLUDED.message,
                 kind = EXCLUDED.kind,
                 enabled = EXCLUDED.enabled,
                 updated_at = NOW()
             RETURNING {}",
            WORKFLOW_COLUMNS
        ))
        .bind(&payload.workflow_key)
        .bind(&payload.name)
        .bind(&payload.title)
        .bind(&payload.message)
        .bind(&payload.kind)
        .bind(payload.enabled)
        .fetch_one(&self.pool)
        .await?;
        Ok(workflow)
    }

    pub async fn list_workflows(&self) -> Result<Vec<WorkflowNotificationHistory>> {
        let workflows = sqlx::query_as::<_, WorkflowNotificationHistory>(&format!(
            "SELECT {} FROM workflow_notification_history ORDER BY created_at ASC",
            WORKFLOW_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(workflows)
    }

    /// Fires the named trigger for one user if an enabled rule exists;
    /// silently a no-op otherwise.
    pub async fn trigger_workflow(&self, key: &str, user_id: Uuid) -> Result<Option<Notification>> {
        let Some(workflow) = sqlx::query_as::<_, WorkflowNotificationHistory>(&format!(
            "SELECT {} FROM workflow_notification_history
             WHERE workflow_key = $1 AND enabled = TRUE",
            WORKFLOW_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let notification = self
            .create(
                user_id,
                &workflow.title,
                &workflow.message,
                &workflow.kind,
                None,
            )
            .await?;
        sqlx::query(
            "UPDATE workflow_notification_history
             SET sent_count = sent_count + 1, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(workflow.id)
        .execute(&self.pool)
        .await?;
        Ok(Some(notification))
    }

    async fn job_seeker_ids(&self) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM users WHERE user_type = $1 ORDER BY created_at ASC",
        )
        .bind(user_type::JOB_SEEKER)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn resolve_targets(&self, payload: &SpotSendPayload) -> Result<Vec<Uuid>> {
        match payload.target_mode.as_str() {
            target_mode::ALL => self.job_seeker_ids().await,
            target_mode::SELECTED => {
                let ids = payload
                    .user_ids
                    .clone()
                    .filter(|ids| !ids.is_empty())
                    .ok_or_else(|| {
                        Error::BadRequest(
                            "user_ids is required for a selected-target send".to_string(),
                        )
                    })?;
                Ok(ids)
            }
            target_mode::FILTERED => {
                let filter = payload.filter.clone().unwrap_or_default();
                let ids = sqlx::query_scalar::<_, Uuid>(
                    "SELECT u.id FROM users u
                     JOIN job_seekers js ON js.user_id = u.id
                     WHERE u.user_type = $1
                       AND ($2::boolean IS NULL OR js.interview_enabled = $2)
                       AND ($3::text IS NULL OR js.desired_job_title ILIKE $3)
                     ORDER BY u.created_at ASC",
                )
                .bind(user_type::JOB_SEEKER)
                .bind(filter.interview_enabled)
                .bind(
                    filter
                        .desired_job_title
                        .map(|t| format!("%{}%", t)),
                )
                .fetch_all(&self.pool)
                .await?;
                Ok(ids)
            }
            other => Err(Error::BadRequest(format!("Unknown target mode: {}", other))),
        }
    }
}
