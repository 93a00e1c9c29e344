use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use rsvp_core::RsvpRecord;

use super::r#trait::{decode_document, encode_document, ResponseCollection, ResponseStore, StoreError};

/// Response store backed by a single JSON document (a top-level array).
///
/// All access goes through one async `RwLock`: appends hold the write side for
/// the whole read-modify-write, reads share the read side. The new document is
/// written to a sibling temp file and renamed into place, so the document on
/// disk is always either the old or the new collection.
///
/// The lock is in-process only; a single process must own the document.
#[derive(Debug)]
pub struct JsonFileResponseStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFileResponseStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("replies.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read and parse the document. Caller must hold the lock.
    async fn load(&self) -> Result<ResponseCollection, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => decode_document(&bytes).inspect_err(|e| {
                error!(path = %self.path.display(), error = %e, "reply document is corrupt");
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StoreError::Read(e)),
        }
    }

    /// Replace the document with `records`. Caller must hold the write lock.
    async fn persist(&self, records: &[RsvpRecord]) -> Result<(), StoreError> {
        let bytes = encode_document(records).map_err(|e| StoreError::Write(io::Error::other(e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StoreError::Write)?;
        }

        let tmp = self.temp_path();
        if let Err(e) = write_synced(&tmp, &bytes).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp reply document");
            }
            return Err(StoreError::Write(e));
        }

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(StoreError::Write)
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

#[async_trait::async_trait]
impl ResponseStore for JsonFileResponseStore {
    async fn append(&self, record: RsvpRecord) -> Result<ResponseCollection, StoreError> {
        let _guard = self.lock.write().await;

        let mut records = self.load().await?;
        records.push(record);
        self.persist(&records).await?;

        debug!(path = %self.path.display(), total = records.len(), "reply appended");
        Ok(records)
    }

    async fn read_all(&self) -> Result<ResponseCollection, StoreError> {
        let _guard = self.lock.read().await;
        self.load().await
    }
}
