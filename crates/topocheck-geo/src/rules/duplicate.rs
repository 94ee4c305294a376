use geo::Point;
use std::collections::HashMap;
use topocheck_core::models::{FeatureId, Rule};
use topocheck_core::GeometryStore;

use super::{Findings, TopologyRule};

/// Points sharing exactly the same position, elevation included
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicatePoints;

/// Exact-equality key over every ordinate. `0.0` and `-0.0` compare equal,
/// so they share a key.
fn coordinate_key(point: &Point<f64>, extra: &[f64]) -> Vec<u64> {
    let bits = |v: f64| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() };
    [point.x(), point.y()].iter().chain(extra).map(|&v| bits(v)).collect()
}

impl TopologyRule for DuplicatePoints {
    fn rule(&self) -> Rule {
        Rule::DuplicatePoint
    }

    fn evaluate(&self, store: &GeometryStore) -> Findings {
        let mut findings = Findings::new(self.rule());

        let mut groups: HashMap<Vec<u64>, Vec<(FeatureId, Point<f64>)>> = HashMap::new();
        for (id, point) in store.points() {
            let extra = store.get(id).map(|f| f.ordinates.at(0)).unwrap_or_default();
            // NaN never equals anything, itself included
            if point.x().is_nan() || point.y().is_nan() || extra.iter().any(|v| v.is_nan()) {
                continue;
            }
            groups.entry(coordinate_key(point, extra)).or_default().push((id, *point));
        }

        let mut duplicates: Vec<_> = groups.into_values().filter(|g| g.len() > 1).collect();
        duplicates.sort_by_key(|g| g[0].0);

        for group in duplicates {
            let (first, at) = group[0];
            for &(other, _) in &group[1..] {
                findings.flag_pair(
                    first,
                    other,
                    format!("Duplicate points at ({}, {})", at.x(), at.y()),
                );
            }
        }

        findings
    }
}
