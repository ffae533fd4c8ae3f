//! Console mailer - writes messages to the trace log (for development).

use async_trait::async_trait;

use inkwell_core::ports::{MailError, Mailer, OutgoingMail};

/// Mailer that only logs what it would have sent.
#[derive(Debug, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        tracing::info!(
            from = %mail.from,
            to = ?mail.to,
            subject = %mail.subject,
            body = %mail.body,
            "Mail not delivered: no mail relay configured"
        );
        Ok(())
    }
}
