//! Submission pipeline (application-level orchestration).
//!
//! ```text
//! SubmitRsvp
//!   ↓
//! 1. Validate required fields (no side effects on rejection)
//!   ↓
//! 2. Append to the response store (serialized, durable)
//!   ↓
//! 3. Compute totals over the committed collection
//!   ↓
//! 4. Start guest + organizer notifications (detached, not awaited)
//!   ↓
//! Submitted
//! ```
//!
//! Notifications are only started after the append succeeded, and their
//! outcome never reaches the caller.

use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use rsvp_core::{AttendanceTotals, DomainError, RsvpRecord, SubmitRsvp};

use crate::notifier::{NotificationDispatcher, PendingNotifications};
use crate::response_store::{ResponseStore, StoreError};

#[derive(Debug, Error)]
pub enum SubmitError {
    /// Validation failed; nothing was stored.
    #[error(transparent)]
    Rejected(#[from] DomainError),

    /// The store could not read or write the collection; the reply was not accepted.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of an accepted submission.
#[derive(Debug)]
pub struct Submitted {
    pub record: RsvpRecord,
    pub totals: AttendanceTotals,
    pub total_replies: usize,
    /// Notification sends started for this submission. Dropping this does not cancel them.
    pub notifications: PendingNotifications,
}

/// Orchestrates one RSVP submission.
///
/// - `S`: response store implementation
pub struct SubmissionService<S> {
    store: S,
    notifications: NotificationDispatcher,
}

impl<S> SubmissionService<S>
where
    S: ResponseStore,
{
    pub fn new(store: S, notifications: NotificationDispatcher) -> Self {
        Self { store, notifications }
    }

    pub async fn submit(&self, input: SubmitRsvp) -> Result<Submitted, SubmitError> {
        let submission_id = Uuid::now_v7();
        let span = info_span!("rsvp.submit", %submission_id);

        async move {
            let record = input.validate().inspect_err(|e| {
                info!(reason = %e, "submission rejected");
            })?;

            let committed = self.store.append(record.clone()).await.inspect_err(|e| {
                warn!(error = %e, "submission not persisted");
            })?;

            let totals = AttendanceTotals::compute(&committed);
            info!(
                total_replies = committed.len(),
                yes = totals.yes,
                no = totals.no,
                "reply saved"
            );

            let notifications = self.notifications.dispatch(&record, totals, &committed);

            Ok::<_, SubmitError>(Submitted {
                record,
                totals,
                total_replies: committed.len(),
                notifications,
            })
        }
        .instrument(span)
        .await
    }
}
