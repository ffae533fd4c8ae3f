//! In-memory outbox.

use async_trait::async_trait;
use tokio::sync::Mutex;

use inkwell_core::ports::{MailError, Mailer, OutgoingMail};

/// Mailer that keeps every sent message in memory.
#[derive(Debug, Default)]
pub struct InMemoryMailer {
    outbox: Mutex<Vec<OutgoingMail>>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first.
    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.outbox.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        tracing::debug!(to = ?mail.to, subject = %mail.subject, "Mail stored in outbox");
        self.outbox.lock().await.push(mail);
        Ok(())
    }
}
