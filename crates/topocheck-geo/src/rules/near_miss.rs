use geo::{Distance, Euclidean, Intersects, LineString};
use topocheck_core::config::PairStrategy;
use topocheck_core::models::{FeatureId, Rule};
use topocheck_core::GeometryStore;

use super::{Findings, TopologyRule};
use crate::index::{candidate_pairs, line_envelope};

/// Line strings that do not touch but come within `threshold` of each other.
/// Intersecting pairs are left to [`super::LineIntersections`].
#[derive(Debug, Clone, Copy)]
pub struct LineNearMisses {
    threshold: f64,
    strategy: PairStrategy,
}

impl LineNearMisses {
    pub fn new(threshold: f64, strategy: PairStrategy) -> Self {
        Self { threshold, strategy }
    }
}

impl TopologyRule for LineNearMisses {
    fn rule(&self) -> Rule {
        Rule::LineNearMiss
    }

    fn evaluate(&self, store: &GeometryStore) -> Findings {
        let mut findings = Findings::new(self.rule());

        let lines: Vec<(FeatureId, &LineString<f64>)> = store.lines().collect();
        let envelopes: Vec<_> = lines.iter().map(|(_, l)| line_envelope(l)).collect();

        for (i, j) in candidate_pairs(&envelopes, self.threshold, self.strategy) {
            let (id_i, line_i) = lines[i];
            let (id_j, line_j) = lines[j];
            if line_i.intersects(line_j) {
                continue;
            }
            let distance = Euclidean.distance(line_i, line_j);
            if distance <= self.threshold {
                findings.flag_pair(
                    id_i,
                    id_j,
                    format!("Lines are too close but do not touch ({:.3} m)", distance),
                );
            }
        }

        findings
    }
}
