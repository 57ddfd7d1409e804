use std::time::Duration;

use anyhow::Context as _;
use serde_json::json;

use crate::domain::repository::EmailNotifier;

pub const VERIFICATION_SUBJECT: &str = "Confirm your registration";

pub fn verification_body(code: &str) -> String {
    format!("Your verification code: {code}")
}

/// Transactional-mail HTTP API (Brevo-compatible `POST /v3/smtp/email`).
#[derive(Clone)]
pub struct HttpEmailNotifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    sender: String,
}

impl HttpEmailNotifier {
    pub fn new(
        endpoint: String,
        api_key: String,
        sender: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build mail http client")?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            sender,
        })
    }
}

impl EmailNotifier for HttpEmailNotifier {
    async fn send_verification_code(&self, email: &str, code: &str) -> anyhow::Result<()> {
        let payload = json!({
            "sender": { "email": self.sender },
            "to": [{ "email": email }],
            "subject": VERIFICATION_SUBJECT,
            "textContent": verification_body(code),
        });
        self.client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .context("send verification email")?
            .error_for_status()
            .context("mail api rejected verification email")?;
        tracing::info!(email, "verification email sent");
        Ok(())
    }
}

/// Writes the code to the log instead of sending mail. Used when no mail API is configured.
#[derive(Clone, Default)]
pub struct LogEmailNotifier;

impl EmailNotifier for LogEmailNotifier {
    async fn send_verification_code(&self, email: &str, code: &str) -> anyhow::Result<()> {
        tracing::info!(email, code, "mail not configured; verification code logged");
        Ok(())
    }
}

/// Notifier chosen at start-up.
#[derive(Clone)]
pub enum Mailer {
    Http(HttpEmailNotifier),
    Log(LogEmailNotifier),
}

impl EmailNotifier for Mailer {
    async fn send_verification_code(&self, email: &str, code: &str) -> anyhow::Result<()> {
        match self {
            Self::Http(n) => n.send_verification_code(email, code).await,
            Self::Log(n) => n.send_verification_code(email, code).await,
        }
    }
}
