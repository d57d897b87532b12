//! Delivery sanitization: defaulting rules for incomplete records.
//!
//! The sanitizer turns a sequence of possibly-partial drafts into a
//! sequence of fully-populated deliveries of the same length and order.
//! Defaulting only: a field present in the input is never overwritten or
//! corrected. All randomness flows through an injectable RNG so tests can
//! supply a seeded one.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use dispatch_store::{Delivery, DeliveryDraft, PriorityLabel};

/// Defaulting configuration.
#[derive(Debug, Clone)]
pub struct SanitizeConfig {
    /// Base latitude for generated coordinates.
    pub base_lat: f64,
    /// Base longitude for generated coordinates.
    pub base_lon: f64,
    /// Coordinate jitter bound in degrees (applied as ± on both axes).
    pub jitter_degrees: f64,
    /// Agent roster for random assignment defaults.
    pub roster: Vec<String>,
    /// Reason text marking a defaulted record, as opposed to an oracle
    /// decision.
    pub fallback_reason: String,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        SanitizeConfig {
            base_lat: 22.57,
            base_lon: 88.36,
            jitter_degrees: 0.05,
            roster: ["Ravi", "Amit", "Suman", "Priya", "Rohit"]
                .map(String::from)
                .to_vec(),
            fallback_reason: "Default fallback priority.".to_string(),
        }
    }
}

/// Fills missing delivery fields deterministically with respect to its
/// configuration and RNG.
pub struct Sanitizer {
    config: SanitizeConfig,
    rng: StdRng,
}

impl Sanitizer {
    /// Sanitizer with an entropy-seeded RNG.
    pub fn new(config: SanitizeConfig) -> Self {
        Sanitizer {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Sanitizer with a caller-supplied RNG (deterministic in tests).
    pub fn with_rng(config: SanitizeConfig, rng: StdRng) -> Self {
        Sanitizer { config, rng }
    }

    pub fn config(&self) -> &SanitizeConfig {
        &self.config
    }

    /// Fresh coordinate: base plus bounded jitter on both axes.
    pub fn random_coord(&mut self) -> (f64, f64) {
        let j = self.config.jitter_degrees;
        (
            self.config.base_lat + self.rng.gen_range(-j..=j),
            self.config.base_lon + self.rng.gen_range(-j..=j),
        )
    }

    /// Uniform pick from a slice of choices.
    pub fn pick<'a, T>(&mut self, choices: &'a [T]) -> Option<&'a T> {
        choices.choose(&mut self.rng)
    }

    /// Uniform index into a collection of the given length.
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.rng.gen_range(0..len))
        }
    }

    /// Fill every missing field of every draft, preserving length and
    /// order. Fields already present pass through untouched. Coordinates
    /// are always defaulted as a pair: if either is missing, both are
    /// regenerated.
    pub fn sanitize(&mut self, drafts: Vec<DeliveryDraft>) -> Vec<Delivery> {
        drafts
            .into_iter()
            .enumerate()
            .map(|(i, draft)| self.sanitize_one(i, draft))
            .collect()
    }

    fn sanitize_one(&mut self, index: usize, draft: DeliveryDraft) -> Delivery {
        let n = index + 1;
        let (lat, lon) = match (draft.lat, draft.lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => self.random_coord(),
        };
        let assigned_agent = draft.assigned_agent.unwrap_or_else(|| {
            self.config
                .roster
                .choose(&mut self.rng)
                .cloned()
                .unwrap_or_else(|| "Unassigned".to_string())
        });
        let priority_label = draft.priority_label.unwrap_or_else(|| {
            PriorityLabel::ALL
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(PriorityLabel::Medium)
        });
        let urgency_score = draft
            .urgency_score
            .unwrap_or_else(|| self.rng.gen_range(3..=9));

        Delivery {
            delivery_id: draft.delivery_id.unwrap_or_else(|| format!("D{n}")),
            item: draft.item.unwrap_or_else(|| format!("Package {n}")),
            location: draft.location.unwrap_or_else(|| format!("Location {n}")),
            lat,
            lon,
            assigned_agent,
            priority_label,
            urgency_score,
            reason: draft
                .reason
                .unwrap_or_else(|| self.config.fallback_reason.clone()),
        }
    }
}
