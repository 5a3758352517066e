use reqwest::Client;
use serde_json::json;

/// Outbound mail collaborator. Delivery is a best-effort JSON post to an
/// external gateway; every send reports success as a plain `bool` and is
/// never allowed to fail the operation that requested it.
#[derive(Clone)]
pub struct EmailService {
    client: Client,
    gateway_url: Option<String>,
    gateway_secret: Option<String>,
}

impl EmailService {
    pub fn new(gateway_url: Option<String>, gateway_secret: Option<String>) -> Self {
        Self {
            client: Client::new(),
            gateway_url,
            gateway_secret,
        }
    }

    async fn deliver(&self, to: &str, subject: &str, body: &str) -> bool {
        let Some(url) = &self.gateway_url else {
            tracing::debug!(to, subject, "mail gateway not configured, skipping send");
            return false;
        };

        let mut request = self.client.post(url).json(&json!({
            "to": to,
            "subject": subject,
            "body": body,
        }));
        if let Some(secret) = &self.gateway_secret {
            request = request.header("X-Mail-Secret", secret);
        }

        match request.send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::warn!(to, status = %resp.status(), "mail gateway refused message");
                false
            }
            Err(err) => {
                tracing::warn!(to, error = %err, "mail gateway unreachable");
                false
            }
        }
    }

    /// Initial or replacement login credential. Japanese copy for `ja`,
    /// English otherwise, matching the platform's two UI languages.
    pub async fn send_credentials(&self, to: &str, password: &str, language: Option<&str>) -> bool {
        let (subject, body) = if language == Some("ja") {
            (
                "【JustJoin】ログイン情報のお知らせ".to_string(),
                format!(
                    "JustJoinへのご登録ありがとうございます。\n初回ログイン用パスワード: {}\nログイン後の変更をおすすめします。",
                    password
                ),
            )
        } else {
            (
                "Your JustJoin login credentials".to_string(),
                format!(
                    "Welcome to JustJoin.\nYour temporary password is: {}\nPlease change it after your first login.",
                    password
                ),
            )
        };
        self.deliver(to, &subject, &body).await
    }

    pub async fn send_company_received(&self, to: &str) -> bool {
        self.deliver(
            to,
            "JustJoin registration received",
            "Thank you for registering your company. An administrator will review your application; you will receive your login credentials once it is approved.",
        )
        .await
    }

    pub async fn send_admin_company_registered(&self, to: &str, company_name: &str, company_email: &str) -> bool {
        self.deliver(
            to,
            "New company registration awaiting review",
            &format!(
                "Company \"{}\" ({}) has registered and is awaiting approval.",
                company_name, company_email
            ),
        )
        .await
    }

    pub async fn send_company_rejected(&self, to: &str, reason: Option<&str>) -> bool {
        let body = match reason {
            Some(reason) => format!(
                "Your company registration was not approved.\nReason: {}",
                reason
            ),
            None => "Your company registration was not approved.".to_string(),
        };
        self.deliver(to, "JustJoin registration result", &body).await
    }

    pub async fn send_password_changed(&self, to: &str) -> bool {
        self.deliver(
            to,
            "Your JustJoin password was changed",
            "Your password was just changed. If this was not you, contact support immediately.",
        )
        .await
    }

    pub async fn send_error_alert(&self, to: &str, summary: &str) -> bool {
        self.deliver(to, "JustJoin backend error alert", summary).await
    }
}
