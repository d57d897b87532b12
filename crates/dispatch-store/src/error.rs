//! Error types for dispatch-store

use thiserror::Error;

/// Errors that can occur in the delivery persistence layer.
///
/// Store failures are hard errors: there is no safe fallback for
/// unreadable or unwritable state, so callers propagate these untouched.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem read/write error
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted document could not be encoded or decoded
    #[error("store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Optimistic save lost the race against a concurrent writer
    #[error("store version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },
}
