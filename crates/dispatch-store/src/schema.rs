//! Schema definitions for the persisted delivery set
//!
//! Two shapes of the same record:
//! - `Delivery`: canonical, fully-populated record (post-sanitization)
//! - `DeliveryDraft`: untrusted partial record (oracle output, legacy files)
//!
//! `DeliveryDraft` deserialization is deliberately lenient: a malformed
//! field (non-numeric coordinate, out-of-range urgency, unknown priority
//! string) decodes to `None` instead of failing, so the sanitizer can
//! default it rather than reject the record.

use serde::{Deserialize, Serialize};

/// Priority bucket assigned to a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorityLabel {
    High,
    Medium,
    Low,
}

impl PriorityLabel {
    /// All labels, in descending urgency, for uniform random defaulting.
    pub const ALL: [PriorityLabel; 3] = [
        PriorityLabel::High,
        PriorityLabel::Medium,
        PriorityLabel::Low,
    ];

    /// Case-insensitive parse of the wire strings `High` / `Medium` / `Low`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Some(PriorityLabel::High),
            "medium" => Some(PriorityLabel::Medium),
            "low" => Some(PriorityLabel::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for PriorityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PriorityLabel::High => "High",
            PriorityLabel::Medium => "Medium",
            PriorityLabel::Low => "Low",
        };
        write!(f, "{s}")
    }
}

/// One unit of delivery work, fully populated.
///
/// `delivery_id` is the join key for all merges and is unique within the
/// active set. Every persisted `Delivery` has all fields populated; partial
/// records only exist as [`DeliveryDraft`] before sanitization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    /// Unique identifier within the active set, stable once assigned.
    pub delivery_id: String,

    /// Human-readable description of the item.
    pub item: String,

    /// Human-readable place name.
    pub location: String,

    /// Latitude in degrees.
    pub lat: f64,

    /// Longitude in degrees.
    pub lon: f64,

    /// Identifier of the agent currently responsible. Mutable.
    pub assigned_agent: String,

    /// Priority bucket.
    pub priority_label: PriorityLabel,

    /// Urgency in [1, 10] (defaulted values fall in [3, 9]).
    pub urgency_score: u8,

    /// Free-text rationale for the current priority/assignment.
    pub reason: String,
}

impl Delivery {
    /// Coordinate pair as `(lat, lon)`.
    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

pub mod lenient {
    //! Field-level lenient decoders for untrusted records.

    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::PriorityLabel;

    pub fn string_opt<'de, D>(de: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(de)?;
        Ok(match v {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn f64_opt<'de, D>(de: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(de)?;
        Ok(match v {
            Value::Number(n) => n.as_f64().filter(|x| x.is_finite()),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
            _ => None,
        })
    }

    pub fn priority_opt<'de, D>(de: D) -> Result<Option<PriorityLabel>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(de)?;
        Ok(match v {
            Value::String(s) => PriorityLabel::parse(&s),
            _ => None,
        })
    }

    pub fn urgency_opt<'de, D>(de: D) -> Result<Option<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(de)?;
        let n = match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        Ok(n.filter(|n| (1..=10).contains(n)).map(|n| n as u8))
    }
}

/// Untrusted, possibly partial delivery record.
///
/// This is the shape of oracle responses and pre-sanitization input: every
/// field is optional and malformed values decode to `None`. Unknown fields
/// are ignored. The sanitizer turns a sequence of drafts into a sequence of
/// fully-populated [`Delivery`] records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryDraft {
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub delivery_id: Option<String>,

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

impl From<Delivery> for DeliveryDraft {
    fn from(d: Delivery) -> Self {
        DeliveryDraft {
            delivery_id: Some(d.delivery_id),
            item: Some(d.item),
            location: Some(d.location),
            lat: Some(d.lat),
            lon: Some(d.lon),
            assigned_agent: Some(d.assigned_agent),
            priority_label: Some(d.priority_label),
            urgency_score: Some(d.urgency_score),
            reason: Some(d.reason),
        }
    }
}
