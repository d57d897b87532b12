//! Deterministic offline oracle
//!
//! Stands in for the network-backed oracle in tests and demo mode. The
//! priority heuristic is a keyword scan over the item description; the
//! route heuristic rotates each delivery to the next roster agent when a
//! disruption event is present.

use async_trait::async_trait;

use dispatch_store::{Delivery, DeliveryDraft, PriorityLabel};

use crate::client::{DisruptionEvent, OracleResult, PriorityOracle, RouteOracle};
use crate::wire::RoutePatch;

const MEDICAL_TERMS: [&str; 7] = [
    "insulin", "medicine", "medical", "blood", "pharmacy", "clinic", "vaccine",
];
const ELECTRONICS_TERMS: [&str; 5] = ["laptop", "monitor", "phone", "computer", "electronics"];

/// Offline oracle with deterministic answers.
pub struct StubOracle {
    roster: Vec<String>,
}

impl StubOracle {
    pub fn new(roster: Vec<String>) -> Self {
        StubOracle { roster }
    }

    fn next_agent(&self, current: &str) -> String {
        if self.roster.is_empty() {
            return current.to_string();
        }
        let idx = self
            .roster
            .iter()
            .position(|a| a.eq_ignore_ascii_case(current))
            .map(|i| (i + 1) % self.roster.len())
            .unwrap_or(0);
        self.roster[idx].clone()
    }

    fn score(item: &str) -> (PriorityLabel, u8, String) {
        let lower = item.to_ascii_lowercase();
        if MEDICAL_TERMS.iter().any(|t| lower.contains(t)) {
            (
                PriorityLabel::High,
                9,
                "Medical item; time-critical delivery.".to_string(),
            )
        } else if ELECTRONICS_TERMS.iter().any(|t| lower.contains(t)) {
            (
                PriorityLabel::Medium,
                6,
                "High-value electronics; deliver promptly.".to_string(),
            )
        } else {
            (
                PriorityLabel::Low,
                4,
                "Routine delivery; no urgency signals.".to_string(),
            )
        }
    }
}

#[async_trait]
impl PriorityOracle for StubOracle {
    async fn analyze(&self, deliveries: &[Delivery]) -> OracleResult<Vec<DeliveryDraft>> {
        Ok(deliveries
            .iter()
            .map(|d| {
                let (label, score, reason) = Self::score(&d.item);
                let mut draft = DeliveryDraft::from(d.clone());
                draft.priority_label = Some(label);
                draft.urgency_score = Some(score);
                draft.reason = Some(reason);
                draft
            })
            .collect())
    }
}

#[async_trait]
impl RouteOracle for StubOracle {
    async fn reoptimize(
        &self,
        deliveries: &[Delivery],
        event: Option<&DisruptionEvent>,
    ) -> OracleResult<Vec<RoutePatch>> {
        let patches = match event {
            Some(event) => deliveries
                .iter()
                .map(|d| RoutePatch {
                    delivery_id: d.delivery_id.clone(),
                    assigned_agent: Some(self.next_agent(&d.assigned_agent)),
                    reason: Some(format!("Rerouted: {event}")),
                    ..Default::default()
                })
                .collect(),
            None => deliveries
                .iter()
                .map(|d| RoutePatch::identity(&d.delivery_id))
                .collect(),
        };
        Ok(patches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<String> {
        ["Ravi", "Amit", "Suman"].map(String::from).to_vec()
    }

    fn delivery(id: &str, item: &str, agent: &str) -> Delivery {
        Delivery {
            delivery_id: id.into(),
            item: item.into(),
            location: "New Town".into(),
            lat: 22.57,
            lon: 88.36,
            assigned_agent: agent.into(),
            priority_label: PriorityLabel::Low,
            urgency_score: 3,
            reason: "seed".into(),
        }
    }

    #[tokio::test]
    async fn medical_items_score_high() {
        let oracle = StubOracle::new(roster());
        let drafts = oracle
            .analyze(&[delivery("D1", "Insulin Vial for Apollo Pharmacy", "Ravi")])
            .await
            .unwrap();
        assert_eq!(drafts[0].priority_label, Some(PriorityLabel::High));
        assert_eq!(drafts[0].urgency_score, Some(9));
    }

    #[tokio::test]
    async fn plain_items_score_low() {
        let oracle = StubOracle::new(roster());
        let drafts = oracle
            .analyze(&[delivery("D1", "Poster Banners for College Fest", "Ravi")])
            .await
            .unwrap();
        assert_eq!(drafts[0].priority_label, Some(PriorityLabel::Low));
    }

    #[tokio::test]
    async fn event_rotates_agents() {
        let oracle = StubOracle::new(roster());
        let event = DisruptionEvent::new("Flood in Howrah").unwrap();
        let patches = oracle
            .reoptimize(&[delivery("D1", "Groceries", "Ravi")], Some(&event))
            .await
            .unwrap();
        assert_eq!(patches[0].assigned_agent.as_deref(), Some("Amit"));
        assert_eq!(patches[0].reason.as_deref(), Some("Rerouted: Flood in Howrah"));
    }

    #[tokio::test]
    async fn no_event_returns_identity_patches() {
        let oracle = StubOracle::new(roster());
        let patches = oracle
            .reoptimize(&[delivery("D1", "Groceries", "Ravi")], None)
            .await
            .unwrap();
        assert_eq!(patches[0], RoutePatch::identity("D1"));
    }

    #[tokio::test]
    async fn analysis_is_deterministic() {
        let oracle = StubOracle::new(roster());
        let set = vec![delivery("D1", "Laptop for TechPark Office", "Ravi")];
        let a = oracle.analyze(&set).await.unwrap();
        let b = oracle.analyze(&set).await.unwrap();
        assert_eq!(a, b);
    }
}
