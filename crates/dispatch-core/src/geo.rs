//! Pure geospatial helpers: per-agent grouping, route ordering, distance.
//!
//! Route "optimization" is an assignment concern driven by the route
//! oracle, not a geometric-path concern: `route_order` deliberately keeps
//! the existing sequence order and performs no path reordering.

use std::collections::BTreeMap;

use dispatch_store::Delivery;

/// Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Partition deliveries by `assigned_agent`, case-sensitive as stored.
///
/// Every delivery lands in exactly one group; the groups are a disjoint
/// cover of the input. Within a group, input order is preserved.
pub fn group_by_agent(deliveries: &[Delivery]) -> BTreeMap<String, Vec<Delivery>> {
    let mut groups: BTreeMap<String, Vec<Delivery>> = BTreeMap::new();
    for d in deliveries {
        groups
            .entry(d.assigned_agent.clone())
            .or_default()
            .push(d.clone());
    }
    groups
}

/// Coordinates of the deliveries in their existing sequence order.
pub fn route_order(deliveries: &[Delivery]) -> Vec<(f64, f64)> {
    deliveries.iter().map(Delivery::coords).collect()
}

/// Great-circle distance in kilometres between two `(lat, lon)` points.
pub fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Total path length in kilometres along the existing route order.
pub fn route_length_km(deliveries: &[Delivery]) -> f64 {
    let coords = route_order(deliveries);
    coords
        .windows(2)
        .map(|pair| haversine_km(pair[0], pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_store::PriorityLabel;

    fn delivery(id: &str, agent: &str, lat: f64, lon: f64) -> Delivery {
        Delivery {
            delivery_id: id.into(),
            item: format!("Package {id}"),
            location: "Dumdum".into(),
            lat,
            lon,
            assigned_agent: agent.into(),
            priority_label: PriorityLabel::Low,
            urgency_score: 4,
            reason: "seed".into(),
        }
    }

    #[test]
    fn grouping_is_a_disjoint_cover() {
        let set = vec![
            delivery("D1", "Ravi", 22.5, 88.3),
            delivery("D2", "Amit", 22.6, 88.4),
            delivery("D3", "Ravi", 22.7, 88.5),
        ];
        let groups = group_by_agent(&set);

        let total: usize = groups.values().map(Vec::len).sum();
        assert_eq!(total, set.len());
        assert_eq!(groups["Ravi"].len(), 2);
        assert_eq!(groups["Amit"].len(), 1);
        assert_eq!(groups["Ravi"][0].delivery_id, "D1");
        assert_eq!(groups["Ravi"][1].delivery_id, "D3");
    }

    #[test]
    fn grouping_is_case_sensitive_as_stored() {
        let set = vec![
            delivery("D1", "Ravi", 22.5, 88.3),
            delivery("D2", "ravi", 22.6, 88.4),
        ];
        let groups = group_by_agent(&set);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn route_order_preserves_sequence() {
        let set = vec![
            delivery("D1", "Ravi", 22.5, 88.3),
            delivery("D2", "Ravi", 22.6, 88.4),
        ];
        assert_eq!(route_order(&set), vec![(22.5, 88.3), (22.6, 88.4)]);
    }

    #[test]
    fn haversine_zero_for_same_point() {
        assert!(haversine_km((22.57, 88.36), (22.57, 88.36)).abs() < 1e-9);
    }

    #[test]
    fn haversine_known_distance() {
        // Kolkata to Delhi, roughly 1300 km great-circle.
        let km = haversine_km((22.57, 88.36), (28.61, 77.21));
        assert!((1250.0..1400.0).contains(&km), "got {km}");
    }

    #[test]
    fn haversine_is_symmetric() {
        let a = (22.57, 88.36);
        let b = (22.60, 88.40);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }
}
