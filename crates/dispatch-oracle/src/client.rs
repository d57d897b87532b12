//! Oracle trait definitions and the disruption event carried to them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use dispatch_store::{Delivery, DeliveryDraft};

use crate::error::OracleError;
use crate::wire::RoutePatch;

/// Result type for oracle calls
pub type OracleResult<T> = std::result::Result<T, OracleError>;

/// Free-text description of a disruption (e.g. "Rally in Park Street").
///
/// Ephemeral: carried through a single re-optimization call and reflected
/// into affected deliveries' `reason` fields by the route oracle. Never
/// persisted as its own record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisruptionEvent(String);

impl DisruptionEvent {
    /// Build an event from free text. Returns `None` for blank input.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(DisruptionEvent(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DisruptionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// External service that scores delivery priority.
///
/// Returns a full replacement set with priority fields populated. The
/// output is untrusted (arbitrary external text) and may still be
/// partially malformed, hence `DeliveryDraft` rather than `Delivery`;
/// sanitization is always the final gate before persistence.
#[async_trait]
pub trait PriorityOracle: Send + Sync {
    async fn analyze(&self, deliveries: &[Delivery]) -> OracleResult<Vec<DeliveryDraft>>;
}

/// External service that reassigns or reroutes deliveries.
///
/// Returns partial records keyed by `delivery_id`, each containing only
/// the fields the oracle chose to change (typically `assigned_agent` and
/// `reason`). The merged set's membership is exactly the ids the oracle
/// returned; see the engine's merge rule.
#[async_trait]
pub trait RouteOracle: Send + Sync {
    async fn reoptimize(
        &self,
        deliveries: &[Delivery],
        event: Option<&DisruptionEvent>,
    ) -> OracleResult<Vec<RoutePatch>>;
}
