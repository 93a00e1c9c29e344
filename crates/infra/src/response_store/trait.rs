use std::sync::Arc;

use thiserror::Error;

use rsvp_core::RsvpRecord;

/// Ordered responses, insertion order = submission order.
pub type ResponseCollection = Vec<RsvpRecord>;

/// Response store operation error.
///
/// These are **infrastructure errors**. Read and write faults are kept apart so
/// callers can tell "could not load prior replies" from "could not save this one".
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persisted document exists but could not be read.
    #[error("failed to read replies: {0}")]
    Read(#[source] std::io::Error),

    /// Writing the updated document failed; the record was not persisted.
    #[error("failed to write replies: {0}")]
    Write(#[source] std::io::Error),

    /// The persisted document is present but is not a valid reply collection.
    ///
    /// Corrupt state is never treated as empty: doing so would overwrite every
    /// stored reply on the next append.
    #[error("persisted replies are corrupt: {0}")]
    Corrupt(String),
}

/// Append-only store of RSVP responses.
///
/// ## Append Semantics
///
/// `append()`:
/// - adds the record as the last element, never touching earlier records
/// - is serialized against every other `append()` and `read_all()` so that no
///   submission is lost when requests interleave
/// - returns the committed collection (including the new record)
///
/// ## Read Semantics
///
/// `read_all()`:
/// - returns every record appended before the call began, in order
/// - never observes a partially written append
/// - returns an empty collection if nothing has been stored yet
#[async_trait::async_trait]
pub trait ResponseStore: Send + Sync {
    /// Append a record to the tail of the collection.
    async fn append(&self, record: RsvpRecord) -> Result<ResponseCollection, StoreError>;

    /// Load a snapshot of the full collection.
    async fn read_all(&self) -> Result<ResponseCollection, StoreError>;
}

#[async_trait::async_trait]
impl<S> ResponseStore for Arc<S>
where
    S: ResponseStore + ?Sized,
{
    async fn append(&self, record: RsvpRecord) -> Result<ResponseCollection, StoreError> {
        (**self).append(record).await
    }

    async fn read_all(&self) -> Result<ResponseCollection, StoreError> {
        (**self).read_all().await
    }
}

/// Serialize a collection the way it is persisted (pretty JSON array, two-space indent).
pub fn encode_document(records: &[RsvpRecord]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(records)
}

/// Parse a persisted document. Blank documents read as an empty collection.
pub fn decode_document(bytes: &[u8]) -> Result<ResponseCollection, StoreError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt(e.to_string()))
}
