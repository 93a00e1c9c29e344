//! Outbound email notification (best-effort, never on the request's critical path).
//!
//! - `message`: pure composition of the guest confirmation and organizer summary
//! - `http`: email-API transport (`reqwest`)
//! - `log`: transport that only logs, plus an in-memory recorder for tests/dev
//! - `dispatcher`: detached, time-bounded delivery after a successful append

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

pub mod dispatcher;
pub mod http;
pub mod log;
pub mod message;

pub use dispatcher::{NotificationDispatcher, PendingNotifications};
pub use http::HttpEmailNotifier;
pub use log::{LogNotifier, RecordingNotifier};
pub use message::{compose_guest_confirmation, compose_organizer_summary, EmailSettings};

/// A fully rendered email, independent of the transport that delivers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// Attachment payload, already base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: String,
}

/// Notification delivery error. Observed by logging only; never surfaced to clients.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("email transport failed: {0}")]
    Transport(String),

    #[error("email API rejected message (status {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("email send timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to compose email: {0}")]
    Compose(String),
}

/// Email-sending capability.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), NotificationError>;
}
