//! JSON-file-backed delivery store
//!
//! Persists the whole set as a single pretty-printed JSON document with a
//! version counter. Writes go to a sibling temp file and are renamed into
//! place, so readers never observe a partially written set.
//!
//! A legacy bare array of deliveries (the original single-file format,
//! without the version wrapper) still loads and reports version 0.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::schema::Delivery;
use crate::storage_traits::{DeliveryStore, StoreDocument, StoreResult};

/// File-backed delivery store with atomic full-set replace.
///
/// A process-local mutex serializes writers within this process; writers
/// in other processes still race (last rename wins).
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store over the given file path. The file need not exist
    /// yet; the first `save` creates it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> StoreResult<Option<StoreDocument>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let value: Value = serde_json::from_slice(&bytes)?;
        let doc = match value {
            // Legacy format: bare array of deliveries, no version wrapper.
            Value::Array(_) => {
                let deliveries: Vec<Delivery> = serde_json::from_value(value)?;
                StoreDocument::next(0, deliveries)
            }
            other => serde_json::from_value(other)?,
        };
        Ok(Some(doc))
    }

    async fn write_document(&self, doc: &StoreDocument) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(
            path = %self.path.display(),
            version = doc.version,
            count = doc.deliveries.len(),
            "delivery set saved"
        );
        Ok(())
    }
}

#[async_trait]
impl DeliveryStore for JsonFileStore {
    async fn load(&self) -> StoreResult<Vec<Delivery>> {
        Ok(self
            .read_document()
            .await?
            .map(|doc| doc.deliveries)
            .unwrap_or_default())
    }

    async fn save(&self, deliveries: &[Delivery]) -> StoreResult<u64> {
        let _guard = self.write_lock.lock().await;
        let current = self.read_document().await?.map(|d| d.version).unwrap_or(0);
        let doc = StoreDocument::next(current + 1, deliveries.to_vec());
        self.write_document(&doc).await?;
        Ok(doc.version)
    }

    async fn save_versioned(
        &self,
        deliveries: &[Delivery],
        expected_version: u64,
    ) -> StoreResult<u64> {
        let _guard = self.write_lock.lock().await;
        let current = self.read_document().await?.map(|d| d.version).unwrap_or(0);
        if current != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                actual: current,
            });
        }
        let doc = StoreDocument::next(current + 1, deliveries.to_vec());
        self.write_document(&doc).await?;
        Ok(doc.version)
    }

    async fn version(&self) -> StoreResult<u64> {
        Ok(self.read_document().await?.map(|d| d.version).unwrap_or(0))
    }
}
