//! Storage trait definitions for the delivery set
//!
//! `DeliveryStore` is the single storage abstraction: the whole active set
//! is one record with full-set replace semantics. Backends must make
//! `save` atomic with respect to readers (a reader never observes a
//! partially written set).
//!
//! Concurrency discipline: the store does not serialize callers'
//! load-mutate-save sequences. Two concurrent writers race and the last
//! `save` wins, silently discarding the other's changes. Callers that need
//! protection use `save_versioned`, which fails with
//! `StoreError::VersionConflict` instead of overwriting.
//!
//! An in-memory fake is provided for testing via the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::schema::Delivery;

/// Result type for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// On-disk document wrapping the delivery set.
///
/// `version` increments on every successful save and backs the optimistic
/// `save_versioned` path. Deliveries are kept in stable insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDocument {
    pub version: u64,
    pub saved_at: DateTime<Utc>,
    pub deliveries: Vec<Delivery>,
}

impl StoreDocument {
    /// Next document in the version chain.
    pub fn next(version: u64, deliveries: Vec<Delivery>) -> Self {
        StoreDocument {
            version,
            saved_at: Utc::now(),
            deliveries,
        }
    }
}

/// Persistent store for the active delivery set.
///
/// Guarantees:
/// - `load()` returns the persisted set in insertion order, or an empty
///   vec when nothing has been saved yet.
/// - `save(set)` atomically replaces the whole persisted set and returns
///   the new version.
/// - The store never validates delivery shape; callers sanitize before
///   saving.
#[async_trait]
pub trait DeliveryStore: Send + Sync {
    /// Load the current delivery set. Empty vec if none exists yet.
    async fn load(&self) -> StoreResult<Vec<Delivery>>;

    /// Atomically replace the persisted set. Last write wins.
    async fn save(&self, deliveries: &[Delivery]) -> StoreResult<u64>;

    /// Replace the persisted set only if the current version matches
    /// `expected_version`. Returns `StoreError::VersionConflict` when a
    /// concurrent writer got there first.
    async fn save_versioned(
        &self,
        deliveries: &[Delivery],
        expected_version: u64,
    ) -> StoreResult<u64>;

    /// Current persisted version (0 when nothing has been saved).
    async fn version(&self) -> StoreResult<u64>;
}
