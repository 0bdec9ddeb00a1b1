use async_trait::async_trait;
use std::sync::Mutex;

use super::{EmailMessage, MailError, Mailer};

/// Logs outgoing mail instead of delivering it and keeps a copy of each message.
#[derive(Default)]
pub struct LogMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl LogMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body_len = message.body.len(),
            "email (log only)"
        );
        let mut sent = self
            .sent
            .lock()
            .map_err(|e| MailError::Transport(e.to_string()))?;
        sent.push(message);
        Ok(())
    }
}
