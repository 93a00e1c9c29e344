//! Reply listing: store snapshot plus derived totals.

use serde::Serialize;
use thiserror::Error;

use rsvp_core::{AttendanceTotals, RsvpRecord};

use crate::response_store::{ResponseStore, StoreError};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Read(#[from] StoreError),
}

/// Full reply collection with its totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyListing {
    pub totals: AttendanceTotals,
    pub replies: Vec<RsvpRecord>,
}

/// Read-only view over the response store.
pub struct QueryService<S> {
    store: S,
}

impl<S> QueryService<S>
where
    S: ResponseStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<ReplyListing, QueryError> {
        let replies = self.store.read_all().await?;
        let totals = AttendanceTotals::compute(&replies);
        Ok(ReplyListing { totals, replies })
    }
}
