//! Dispatch-Store: Persistence Layer for the Delivery Set
//!
//! This crate provides the persistence layer for the delivery assignment
//! engine. The whole active delivery set is persisted as a single record
//! with full-set replace semantics: the engine always loads the whole set,
//! computes a new whole set, and saves the whole set.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: atomic replace, optimistic versioning, tolerant reads.
//!
//! ## Key Components
//!
//! - `DeliveryStore`: Backend-agnostic store trait
//! - `JsonFileStore`: JSON-file-backed store with atomic replace
//! - `Delivery` / `DeliveryDraft`: Canonical and untrusted record shapes

mod error;
pub mod fakes;
mod json_file;
pub mod schema;
pub mod storage_traits;

pub use error::StoreError;
pub use fakes::MemoryStore;
pub use json_file::JsonFileStore;
pub use schema::{Delivery, DeliveryDraft, PriorityLabel};
pub use storage_traits::{DeliveryStore, StoreDocument, StoreResult};

/// Result type for dispatch-store operations
pub type Result<T> = std::result::Result<T, StoreError>;
