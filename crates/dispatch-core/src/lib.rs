//! Dispatch Core Library
//!
//! The delivery assignment and re-optimization engine: canonical data
//! model, defaulting/sanitization rules, merge semantics for external
//! routing decisions, geospatial route grouping, and the disruption
//! handling protocol.
//!
//! Re-exports the persistence and oracle layers for programmatic access.

pub mod engine;
pub mod error;
pub mod geo;
pub mod sanitize;
pub mod telemetry;

pub use engine::{
    filter_by_agent, AssignmentEngine, EngineConfig, EngineOutcome, MergePolicy, OutcomeStatus,
};
pub use error::{DispatchError, Result};
pub use sanitize::{SanitizeConfig, Sanitizer};
pub use telemetry::init_tracing;

pub use dispatch_store::{
    Delivery, DeliveryDraft, DeliveryStore, JsonFileStore, MemoryStore, PriorityLabel, StoreError,
};

pub use dispatch_oracle::{
    DisruptionEvent, GeminiConfig, GeminiOracle, OracleError, PriorityOracle, RouteOracle,
    RoutePatch, StubOracle,
};
