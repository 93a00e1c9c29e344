use std::sync::Mutex;

use tracing::info;

use super::{NotificationError, Notifier, OutboundEmail};

/// Notifier used when no email API is configured: logs the message and succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, email: OutboundEmail) -> Result<(), NotificationError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            attachments = email.attachments.len(),
            body = %email.text,
            "email transport not configured; logging message instead"
        );
        Ok(())
    }
}

/// In-memory notifier that records every message. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: OutboundEmail) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .map_err(|_| NotificationError::Transport("recorder lock poisoned".to_string()))?
            .push(email);
        Ok(())
    }
}
