//! Dispatch-Oracle: External Decision-Service Clients
//!
//! The engine delegates two judgment calls to external services and never
//! assumes how they reason, only their input/output contract:
//!
//! - `PriorityOracle`: given the current delivery set, returns a full
//!   replacement set with priority fields populated.
//! - `RouteOracle`: given the set and an optional free-text disruption
//!   event, returns partial records keyed by `delivery_id` containing only
//!   the fields it chose to change.
//!
//! Both responses are untrusted input; callers sanitize before persisting.
//! Any transport, timeout, or parse failure surfaces as `OracleError` so
//! the engine can fall back to defaulted values; oracle failures are
//! never fatal.
//!
//! Two implementations are provided: `GeminiOracle` (network-backed) and
//! `StubOracle` (deterministic, offline, used in tests and demo mode).

mod client;
mod error;
mod gemini;
mod stub;
mod wire;

pub use client::{DisruptionEvent, OracleResult, PriorityOracle, RouteOracle};
pub use error::OracleError;
pub use gemini::{GeminiConfig, GeminiOracle};
pub use stub::StubOracle;
pub use wire::RoutePatch;
