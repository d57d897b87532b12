//! Core error taxonomy.
//!
//! Propagation policy: oracle failures are caught at the engine boundary
//! and converted into a degraded-but-valid result plus a status message;
//! they never reach callers as errors. Store failures have no safe
//! fallback and propagate untouched. Malformed records are absorbed by
//! lenient decoding plus sanitization and never become errors at all.

use dispatch_oracle::OracleError;
use dispatch_store::StoreError;

/// Dispatch engine errors.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Persistence failure; hard error, no fallback.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Oracle setup failure (e.g. missing API key). Runtime oracle
    /// failures never surface here; they degrade into fallback outcomes.
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),
}

/// Result type for dispatch core operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
