//! Error types for dispatch-oracle

use thiserror::Error;

/// Failures talking to an external decision service.
///
/// Every variant means the same thing to callers: the oracle is
/// unavailable and the engine must fall back to defaulted values. None of
/// these are fatal to the core.
#[derive(Error, Debug)]
pub enum OracleError {
    /// Network-level failure reaching the service
    #[error("oracle transport failed: {0}")]
    Transport(String),

    /// Call exceeded the configured timeout
    #[error("oracle call timed out after {0}s")]
    Timeout(u64),

    /// Service answered with a non-success HTTP status
    #[error("oracle returned HTTP {0}")]
    Status(u16),

    /// Response body could not be parsed into the expected shape
    #[error("oracle response malformed: {0}")]
    Malformed(String),

    /// Service is not configured (e.g. missing API key)
    #[error("oracle not configured: {0}")]
    NotConfigured(String),
}

impl From<serde_json::Error> for OracleError {
    fn from(err: serde_json::Error) -> Self {
        OracleError::Malformed(err.to_string())
    }
}
