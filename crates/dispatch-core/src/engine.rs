//! Assignment engine: orchestrates generation, prioritization,
//! re-optimization, and agent views over the shared delivery set.
//!
//! Every mutating operation is a load → mutate → save sequence over the
//! store. The store makes each save atomic, but concurrent mutating
//! sequences race: the last save wins and silently discards the other
//! writer's changes. That matches the original system's documented
//! behavior; callers needing protection can use the store's
//! `save_versioned` directly.
//!
//! Oracle calls are synchronous, single-shot round trips with a transport
//! timeout and no retry. A failure surfaces immediately and the operation
//! degrades to sanitizer-defaulted values; the engine always hands
//! downstream consumers a fully valid set.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use dispatch_oracle::{DisruptionEvent, PriorityOracle, RouteOracle, RoutePatch};
use dispatch_store::{Delivery, DeliveryDraft, DeliveryStore};

use crate::error::Result;
use crate::sanitize::Sanitizer;

/// How route-oracle responses are merged into the prior set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// The merged set's membership is exactly the ids the oracle
    /// returned; prior deliveries the oracle did not mention are dropped.
    /// This mirrors the original system's behavior.
    #[default]
    Narrow,
    /// Prior deliveries the oracle did not mention are kept unchanged;
    /// patches for new ids are appended.
    Union,
}

/// Engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub merge_policy: MergePolicy,
}

impl EngineConfig {
    /// Config from environment: `DISPATCH_MERGE_POLICY=union` switches to
    /// union merging; anything else keeps the default narrow policy.
    pub fn from_env() -> Self {
        let merge_policy = match std::env::var("DISPATCH_MERGE_POLICY") {
            Ok(v) if v.eq_ignore_ascii_case("union") => MergePolicy::Union,
            _ => MergePolicy::Narrow,
        };
        EngineConfig { merge_policy }
    }
}

/// User-visible result status of a dispatcher action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// The oracle-backed path succeeded.
    Applied(String),
    /// The oracle was unavailable; defaulted values were applied instead.
    Fallback(String),
}

impl OutcomeStatus {
    pub fn message(&self) -> &str {
        match self {
            OutcomeStatus::Applied(m) | OutcomeStatus::Fallback(m) => m,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, OutcomeStatus::Fallback(_))
    }
}

/// Result of a mutating engine operation: the persisted set plus a
/// success-or-fallback status string.
#[derive(Debug, Clone)]
pub struct EngineOutcome {
    pub deliveries: Vec<Delivery>,
    pub status: OutcomeStatus,
}

/// Orchestrates the delivery set across store and oracles.
pub struct AssignmentEngine {
    store: Arc<dyn DeliveryStore>,
    priority_oracle: Arc<dyn PriorityOracle>,
    route_oracle: Arc<dyn RouteOracle>,
    sanitizer: Mutex<Sanitizer>,
    config: EngineConfig,
}

impl AssignmentEngine {
    pub fn new(
        store: Arc<dyn DeliveryStore>,
        priority_oracle: Arc<dyn PriorityOracle>,
        route_oracle: Arc<dyn RouteOracle>,
        sanitizer: Sanitizer,
    ) -> Self {
        AssignmentEngine {
            store,
            priority_oracle,
            route_oracle,
            sanitizer: Mutex::new(sanitizer),
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Build one delivery per item description with a fresh jittered
    /// coordinate, a location picked from `location_choices`, and an
    /// agent picked from `roster`; sanitize and persist the batch as the
    /// new set.
    pub async fn generate_batch(
        &self,
        items: &[String],
        location_choices: &[String],
        roster: &[String],
    ) -> Result<EngineOutcome> {
        let set = {
            let mut san = self.sanitizer.lock().unwrap();
            let drafts: Vec<DeliveryDraft> = items
                .iter()
                .map(|item| {
                    let (lat, lon) = san.random_coord();
                    DeliveryDraft {
                        item: Some(item.clone()),
                        location: san.pick(location_choices).cloned(),
                        lat: Some(lat),
                        lon: Some(lon),
                        assigned_agent: san.pick(roster).cloned(),
                        ..Default::default()
                    }
                })
                .collect();
            san.sanitize(drafts)
        };

        self.store.save(&set).await?;
        info!(count = set.len(), "delivery batch generated");
        Ok(EngineOutcome {
            status: OutcomeStatus::Applied(format!(
                "Generated and saved {} deliveries.",
                set.len()
            )),
            deliveries: set,
        })
    }

    /// Ask the priority oracle to score the current set.
    ///
    /// Oracle output is untrusted and passes through the sanitizer before
    /// persistence. On oracle failure the originals are re-defaulted (a
    /// degraded but fully valid set) and persisted instead.
    pub async fn prioritize(&self) -> Result<EngineOutcome> {
        let current = self.store.load().await?;

        let (drafts, status) = match self.priority_oracle.analyze(&current).await {
            Ok(drafts) => (
                drafts,
                OutcomeStatus::Applied("Priorities analyzed successfully.".to_string()),
            ),
            Err(e) => {
                warn!(error = %e, "priority oracle unavailable; applying defaults");
                (
                    fallback_drafts(current),
                    OutcomeStatus::Fallback(format!("Priority fallback: {e}")),
                )
            }
        };

        let set = self.sanitizer.lock().unwrap().sanitize(drafts);
        self.store.save(&set).await?;
        Ok(EngineOutcome {
            deliveries: set,
            status,
        })
    }

    /// Ask the route oracle to reassign or reroute the current set given
    /// an optional disruption event, then merge its partial response.
    ///
    /// On success the merge policy decides membership (see
    /// [`MergePolicy`]); on oracle failure the full original set is
    /// preserved with re-defaulted priorities.
    pub async fn reoptimize(&self, event: Option<DisruptionEvent>) -> Result<EngineOutcome> {
        let current = self.store.load().await?;

        let (drafts, status) = match self.route_oracle.reoptimize(&current, event.as_ref()).await {
            Ok(patches) => {
                info!(
                    patches = patches.len(),
                    prior = current.len(),
                    "route oracle responded"
                );
                (
                    merge_patches(self.config.merge_policy, &current, &patches),
                    OutcomeStatus::Applied("Routes re-optimized successfully.".to_string()),
                )
            }
            Err(e) => {
                warn!(error = %e, "route oracle unavailable; applying defaults");
                (
                    fallback_drafts(current),
                    OutcomeStatus::Fallback(format!("Optimization fallback: {e}")),
                )
            }
        };

        let set = self.sanitizer.lock().unwrap().sanitize(drafts);
        self.store.save(&set).await?;
        Ok(EngineOutcome {
            deliveries: set,
            status,
        })
    }

    /// The full current set (dispatcher read surface).
    pub async fn current_set(&self) -> Result<Vec<Delivery>> {
        Ok(self.store.load().await?)
    }

    /// The current set filtered to one agent's deliveries.
    pub async fn agent_view(&self, agent_id: &str) -> Result<Vec<Delivery>> {
        let set = self.store.load().await?;
        Ok(filter_by_agent(&set, agent_id))
    }

    /// If the agent has no deliveries and the set is non-empty, pick one
    /// delivery uniformly at random, reassign it to the agent, and
    /// persist the whole mutated set.
    ///
    /// Side-effecting: this alters shared state for all viewers, not just
    /// the requester. Returns the agent's deliveries plus the newly
    /// chosen one, if any.
    pub async fn auto_assign_if_unassigned(
        &self,
        agent_id: &str,
    ) -> Result<(Vec<Delivery>, Option<Delivery>)> {
        let mut set = self.store.load().await?;
        let assigned = filter_by_agent(&set, agent_id);
        if !assigned.is_empty() || set.is_empty() {
            return Ok((assigned, None));
        }

        let idx = {
            let mut san = self.sanitizer.lock().unwrap();
            san.pick_index(set.len()).unwrap_or(0)
        };
        set[idx].assigned_agent = capitalize(agent_id);
        let chosen = set[idx].clone();
        self.store.save(&set).await?;
        info!(
            delivery_id = %chosen.delivery_id,
            agent = %chosen.assigned_agent,
            "delivery auto-assigned"
        );
        Ok((vec![chosen.clone()], Some(chosen)))
    }
}

/// Case-insensitive exact match on `assigned_agent`.
pub fn filter_by_agent(set: &[Delivery], agent_id: &str) -> Vec<Delivery> {
    set.iter()
        .filter(|d| d.assigned_agent.eq_ignore_ascii_case(agent_id))
        .cloned()
        .collect()
}

/// Drafts for the fallback path: identity on everything except the
/// priority fields, which are cleared so the sanitizer re-defaults them
/// together with the fallback reason.
fn fallback_drafts(set: Vec<Delivery>) -> Vec<DeliveryDraft> {
    set.into_iter()
        .map(|d| {
            let mut draft = DeliveryDraft::from(d);
            draft.priority_label = None;
            draft.urgency_score = None;
            draft.reason = None;
            draft
        })
        .collect()
}

/// Apply the merge rule for a route-oracle response.
///
/// Each patch overlays the prior record for its id (an empty record when
/// the id is new); patch fields win. Under `Narrow` the result's
/// membership is exactly the patch ids, in response order. Under `Union`
/// unmentioned prior deliveries are kept unchanged in place and patches
/// for new ids are appended.
fn merge_patches(
    policy: MergePolicy,
    prior: &[Delivery],
    patches: &[RoutePatch],
) -> Vec<DeliveryDraft> {
    let prior_by_id: HashMap<&str, &Delivery> = prior
        .iter()
        .map(|d| (d.delivery_id.as_str(), d))
        .collect();

    match policy {
        MergePolicy::Narrow => patches
            .iter()
            .map(|p| p.overlay(prior_by_id.get(p.delivery_id.as_str()).copied()))
            .collect(),
        MergePolicy::Union => {
            let patch_by_id: HashMap<&str, &RoutePatch> = patches
                .iter()
                .map(|p| (p.delivery_id.as_str(), p))
                .collect();
            let prior_ids: HashSet<&str> =
                prior.iter().map(|d| d.delivery_id.as_str()).collect();

            let mut merged: Vec<DeliveryDraft> = prior
                .iter()
                .map(|d| match patch_by_id.get(d.delivery_id.as_str()) {
                    Some(p) => p.overlay(Some(d)),
                    None => DeliveryDraft::from(d.clone()),
                })
                .collect();
            merged.extend(
                patches
                    .iter()
                    .filter(|p| !prior_ids.contains(p.delivery_id.as_str()))
                    .map(|p| p.overlay(None)),
            );
            merged
        }
    }
}

/// First letter upper-cased, rest lower-cased (agent display identity).
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_store::PriorityLabel;

    fn delivery(id: &str, agent: &str) -> Delivery {
        Delivery {
            delivery_id: id.into(),
            item: format!("Package {id}"),
            location: "Howrah".into(),
            lat: 22.57,
            lon: 88.36,
            assigned_agent: agent.into(),
            priority_label: PriorityLabel::Medium,
            urgency_score: 5,
            reason: "seed".into(),
        }
    }

    fn patch(id: &str, agent: Option<&str>, reason: Option<&str>) -> RoutePatch {
        RoutePatch {
            delivery_id: id.into(),
            assigned_agent: agent.map(String::from),
            reason: reason.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn filter_is_case_insensitive() {
        let set = vec![delivery("D1", "Ravi"), delivery("D2", "Amit")];
        assert_eq!(filter_by_agent(&set, "RAVI"), filter_by_agent(&set, "ravi"));
        assert_eq!(filter_by_agent(&set, "ravi").len(), 1);
        assert!(filter_by_agent(&set, "Priya").is_empty());
    }

    #[test]
    fn capitalize_normalizes_agent_names() {
        assert_eq!(capitalize("amit"), "Amit");
        assert_eq!(capitalize("RAVI"), "Ravi");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn narrow_merge_drops_unmentioned_deliveries() {
        let prior = vec![
            delivery("D1", "Ravi"),
            delivery("D2", "Amit"),
            delivery("D3", "Suman"),
        ];
        let patches = vec![
            patch("D1", Some("Amit"), None),
            patch("D2", None, Some("rerouted")),
        ];
        let merged = merge_patches(MergePolicy::Narrow, &prior, &patches);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].delivery_id.as_deref(), Some("D1"));
        assert_eq!(merged[0].assigned_agent.as_deref(), Some("Amit"));
        assert_eq!(merged[0].reason.as_deref(), Some("seed"));
        assert_eq!(merged[1].delivery_id.as_deref(), Some("D2"));
        assert_eq!(merged[1].assigned_agent.as_deref(), Some("Amit"));
        assert_eq!(merged[1].reason.as_deref(), Some("rerouted"));
        assert!(!merged
            .iter()
            .any(|d| d.delivery_id.as_deref() == Some("D3")));
    }

    #[test]
    fn union_merge_keeps_unmentioned_deliveries() {
        let prior = vec![delivery("D1", "Ravi"), delivery("D2", "Amit")];
        let patches = vec![
            patch("D1", Some("Suman"), None),
            patch("D9", Some("Priya"), None),
        ];
        let merged = merge_patches(MergePolicy::Union, &prior, &patches);

        let ids: Vec<&str> = merged
            .iter()
            .map(|d| d.delivery_id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, vec!["D1", "D2", "D9"]);
        assert_eq!(merged[0].assigned_agent.as_deref(), Some("Suman"));
        assert_eq!(merged[1].assigned_agent.as_deref(), Some("Amit"));
    }

    #[test]
    fn fallback_drafts_clear_priority_fields_only() {
        let drafts = fallback_drafts(vec![delivery("D1", "Ravi")]);
        assert_eq!(drafts[0].delivery_id.as_deref(), Some("D1"));
        assert_eq!(drafts[0].assigned_agent.as_deref(), Some("Ravi"));
        assert!(drafts[0].priority_label.is_none());
        assert!(drafts[0].urgency_score.is_none());
        assert!(drafts[0].reason.is_none());
    }

    #[test]
    fn merge_policy_defaults_to_narrow() {
        assert_eq!(EngineConfig::default().merge_policy, MergePolicy::Narrow);
    }
}
