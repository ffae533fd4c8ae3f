//! HTTP mail relay - posts messages as JSON to a transactional mail API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use inkwell_core::ports::{MailError, Mailer, OutgoingMail};

/// Relay endpoint settings.
#[derive(Debug, Clone)]
pub struct HttpMailerConfig {
    pub url: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// Mailer that hands messages to an HTTP relay.
pub struct HttpMailer {
    config: HttpMailerConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    text: &'a str,
}

impl HttpMailer {
    pub fn new(config: HttpMailerConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let payload = RelayPayload {
            from: &mail.from,
            to: &mail.to,
            subject: &mail.subject,
            text: &mail.body,
        };

        let mut request = self.client.post(&self.config.url).json(&payload);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(%status, detail = %detail, "Mail relay rejected message");
            return Err(MailError::Rejected(format!("{status}: {detail}")));
        }

        tracing::info!(to = ?mail.to, "Mail handed to relay");
        Ok(())
    }
}
