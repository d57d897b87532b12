//! In-memory fake for the store trait (testing only)
//!
//! Provides `MemoryStore`, which satisfies the `DeliveryStore` contract
//! without touching the filesystem.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::schema::Delivery;
use crate::storage_traits::{DeliveryStore, StoreResult};

#[derive(Debug, Default)]
struct MemoryState {
    version: u64,
    deliveries: Vec<Delivery>,
}

/// In-memory delivery store backed by a mutex-guarded vec.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an initial set at version 1.
    pub fn seeded(deliveries: Vec<Delivery>) -> Self {
        MemoryStore {
            state: Mutex::new(MemoryState {
                version: 1,
                deliveries,
            }),
        }
    }
}

#[async_trait]
impl DeliveryStore for MemoryStore {
    async fn load(&self) -> StoreResult<Vec<Delivery>> {
        let state = self.state.lock().unwrap();
        Ok(state.deliveries.clone())
    }

    async fn save(&self, deliveries: &[Delivery]) -> StoreResult<u64> {
        let mut state = self.state.lock().unwrap();
        state.version += 1;
        state.deliveries = deliveries.to_vec();
        Ok(state.version)
    }

    async fn save_versioned(
        &self,
        deliveries: &[Delivery],
        expected_version: u64,
    ) -> StoreResult<u64> {
        let mut state = self.state.lock().unwrap();
        if state.version != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                actual: state.version,
            });
        }
        state.version += 1;
        state.deliveries = deliveries.to_vec();
        Ok(state.version)
    }

    async fn version(&self) -> StoreResult<u64> {
        let state = self.state.lock().unwrap();
        Ok(state.version)
    }
}
