use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::{Attachment, NotificationError, Notifier, OutboundEmail};

/// Notifier that posts messages to a JSON email API.
///
/// Request body: `{from, to: [..], subject, html, text, attachments?}` with
/// `Authorization: Bearer <api key>` when a key is configured. Any non-2xx
/// status is a rejection.
#[derive(Debug, Clone)]
pub struct HttpEmailNotifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct EmailApiRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "no_attachments")]
    attachments: &'a [Attachment],
}

fn no_attachments(attachments: &&[Attachment]) -> bool {
    attachments.is_empty()
}

impl HttpEmailNotifier {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }
}

#[async_trait::async_trait]
impl Notifier for HttpEmailNotifier {
    async fn send(&self, email: OutboundEmail) -> Result<(), NotificationError> {
        let body = EmailApiRequest {
            from: &email.from,
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
            attachments: &email.attachments,
        };

        let mut req = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let res = req
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(to = %email.to, status = status.as_u16(), "email accepted by API");
        Ok(())
    }
}
