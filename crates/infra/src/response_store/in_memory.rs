use tokio::sync::RwLock;

use rsvp_core::RsvpRecord;

use super::r#trait::{ResponseCollection, ResponseStore, StoreError};

/// In-memory append-only response store.
///
/// Intended for tests/dev. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryResponseStore {
    records: RwLock<ResponseCollection>,
}

impl InMemoryResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing collection.
    pub fn with_records(records: ResponseCollection) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait::async_trait]
impl ResponseStore for InMemoryResponseStore {
    async fn append(&self, record: RsvpRecord) -> Result<ResponseCollection, StoreError> {
        let mut records = self.records.write().await;
        records.push(record);
        Ok(records.clone())
    }

    async fn read_all(&self) -> Result<ResponseCollection, StoreError> {
        Ok(self.records.read().await.clone())
    }
}
