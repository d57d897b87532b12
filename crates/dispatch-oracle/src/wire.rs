//! Wire types for route-oracle responses.

use serde::{Deserialize, Serialize};

use dispatch_store::schema::lenient;
use dispatch_store::{Delivery, DeliveryDraft, PriorityLabel};

/// One partial record from a route-oracle response.
///
/// `delivery_id` is required: a response entry without it makes the whole
/// response malformed and the call falls back. Every other field is
/// optional and decoded leniently like [`DeliveryDraft`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutePatch {
    pub delivery_id: String,

    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub item: Option<String>,

    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub location: Option<String>,

    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub lat: Option<f64>,

    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub lon: Option<f64>,

    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub assigned_agent: Option<String>,

    #[serde(default, deserialize_with = "lenient::priority_opt")]
    pub priority_label: Option<PriorityLabel>,

    #[serde(default, deserialize_with = "lenient::urgency_opt")]
    pub urgency_score: Option<u8>,

    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub reason: Option<String>,
}

impl RoutePatch {
    /// Empty patch for an id: overlaying it changes nothing.
    pub fn identity(delivery_id: impl Into<String>) -> Self {
        RoutePatch {
            delivery_id: delivery_id.into(),
            ..Default::default()
        }
    }

    /// Overlay this patch onto the prior record for the same id.
    ///
    /// Starts from the prior delivery when one exists (otherwise an empty
    /// record) and replaces every field present in the patch; patch
    /// fields win. The result is a draft because a patch for a brand-new
    /// id carries no guarantee of completeness.
    pub fn overlay(&self, prior: Option<&Delivery>) -> DeliveryDraft {
        let mut draft = match prior {
            Some(d) => DeliveryDraft::from(d.clone()),
            None => DeliveryDraft::default(),
        };
        draft.delivery_id = Some(self.delivery_id.clone());
        if let Some(v) = &self.item {
            draft.item = Some(v.clone());
        }
        if let Some(v) = &self.location {
            draft.location = Some(v.clone());
        }
        if let Some(v) = self.lat {
            draft.lat = Some(v);
        }
        if let Some(v) = self.lon {
            draft.lon = Some(v);
        }
        if let Some(v) = &self.assigned_agent {
            draft.assigned_agent = Some(v.clone());
        }
        if let Some(v) = self.priority_label {
            draft.priority_label = Some(v);
        }
        if let Some(v) = self.urgency_score {
            draft.urgency_score = Some(v);
        }
        if let Some(v) = &self.reason {
            draft.reason = Some(v.clone());
        }
        draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prior() -> Delivery {
        Delivery {
            delivery_id: "D1".into(),
            item: "Insulin Vial".into(),
            location: "Salt Lake".into(),
            lat: 22.57,
            lon: 88.36,
            assigned_agent: "Ravi".into(),
            priority_label: PriorityLabel::High,
            urgency_score: 9,
            reason: "Medical supply".into(),
        }
    }

    #[test]
    fn patch_fields_win_over_prior() {
        let patch: RoutePatch = serde_json::from_str(
            r#"{"delivery_id": "D1", "assigned_agent": "Amit", "reason": "rerouted"}"#,
        )
        .unwrap();
        let merged = patch.overlay(Some(&prior()));

        assert_eq!(merged.assigned_agent.as_deref(), Some("Amit"));
        assert_eq!(merged.reason.as_deref(), Some("rerouted"));
        // Untouched fields come from the prior record.
        assert_eq!(merged.item.as_deref(), Some("Insulin Vial"));
        assert_eq!(merged.lat, Some(22.57));
        assert_eq!(merged.priority_label, Some(PriorityLabel::High));
    }

    #[test]
    fn patch_for_unknown_id_starts_empty() {
        let patch: RoutePatch =
            serde_json::from_str(r#"{"delivery_id": "D9", "assigned_agent": "Priya"}"#).unwrap();
        let merged = patch.overlay(None);

        assert_eq!(merged.delivery_id.as_deref(), Some("D9"));
        assert_eq!(merged.assigned_agent.as_deref(), Some("Priya"));
        assert!(merged.item.is_none());
        assert!(merged.lat.is_none());
    }

    #[test]
    fn missing_delivery_id_fails_to_parse() {
        let result: Result<RoutePatch, _> =
            serde_json::from_str(r#"{"assigned_agent": "Amit"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn identity_patch_changes_nothing() {
        let merged = RoutePatch::identity("D1").overlay(Some(&prior()));
        assert_eq!(merged, DeliveryDraft::from(prior()));
    }
}
