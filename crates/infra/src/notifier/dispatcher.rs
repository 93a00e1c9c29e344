//! Fire-and-forget notification delivery.
//!
//! Each message is sent on its own detached task, bounded by a timeout and by
//! a cap on in-flight sends. Outcomes are logged and otherwise dropped: no
//! retry, no queue, no ordering between messages. Sends still in flight when
//! the process exits are lost.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};

use rsvp_core::{AttendanceTotals, RsvpRecord};

use super::message::{compose_guest_confirmation, compose_organizer_summary, EmailSettings};
use super::{NotificationError, Notifier, OutboundEmail};

/// Default bound on a single send.
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);
/// Default cap on concurrently running sends.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Handles of the sends started for one submission.
///
/// Production callers drop this; tests await [`PendingNotifications::settled`].
#[derive(Debug, Default)]
pub struct PendingNotifications {
    handles: Vec<JoinHandle<()>>,
}

impl PendingNotifications {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait until every started send has finished (successfully or not).
    pub async fn settled(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "notification task aborted");
            }
        }
    }
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    settings: Arc<EmailSettings>,
    timeout: Duration,
    in_flight: Arc<Semaphore>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, settings: EmailSettings) -> Self {
        Self {
            notifier,
            settings: Arc::new(settings),
            timeout: DEFAULT_NOTIFY_TIMEOUT,
            in_flight: Arc::new(Semaphore::new(DEFAULT_MAX_IN_FLIGHT)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Cap on concurrently running sends, clamped to `Semaphore::MAX_PERMITS`.
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.in_flight = Arc::new(Semaphore::new(max.min(Semaphore::MAX_PERMITS)));
        self
    }

    pub fn settings(&self) -> &EmailSettings {
        &self.settings
    }

    /// Start both messages for a persisted submission without waiting for them.
    pub fn dispatch(
        &self,
        record: &RsvpRecord,
        totals: AttendanceTotals,
        snapshot: &[RsvpRecord],
    ) -> PendingNotifications {
        let handles = [
            self.notify_guest_confirmation(record),
            self.notify_summary(record, totals, snapshot),
        ]
        .into_iter()
        .flatten()
        .collect();

        PendingNotifications { handles }
    }

    /// Echo the answer back to the guest.
    pub fn notify_guest_confirmation(&self, record: &RsvpRecord) -> Option<JoinHandle<()>> {
        let email = compose_guest_confirmation(&self.settings, record);
        self.spawn_send("guest_confirmation", email)
    }

    /// Send totals and the full reply document to the organizer.
    pub fn notify_summary(
        &self,
        newest: &RsvpRecord,
        totals: AttendanceTotals,
        snapshot: &[RsvpRecord],
    ) -> Option<JoinHandle<()>> {
        match compose_organizer_summary(&self.settings, newest, totals, snapshot, Utc::now()) {
            Ok(Some(email)) => self.spawn_send("organizer_summary", email),
            Ok(None) => {
                info!(
                    yes = totals.yes,
                    no = totals.no,
                    total = snapshot.len(),
                    "no organizer address configured; summary not sent"
                );
                None
            }
            Err(e) => {
                warn!(error = %e, "organizer summary not sent");
                None
            }
        }
    }

    fn spawn_send(&self, kind: &'static str, email: OutboundEmail) -> Option<JoinHandle<()>> {
        let Ok(permit) = self.in_flight.clone().try_acquire_owned() else {
            warn!(kind, to = %email.to, "too many notifications in flight; dropping message");
            return None;
        };

        let notifier = self.notifier.clone();
        let timeout = self.timeout;
        let task = async move {
            let _permit = permit;
            let outcome = match tokio::time::timeout(timeout, notifier.send(email)).await {
                Ok(res) => res,
                Err(_) => Err(NotificationError::Timeout(timeout)),
            };
            match outcome {
                Ok(()) => debug!(kind, "notification sent"),
                Err(e) => warn!(kind, error = %e, "notification failed"),
            }
        };

        Some(tokio::spawn(task.in_current_span()))
    }
}
