use geo::{Distance, Euclidean, Point};
use topocheck_core::config::PairStrategy;
use topocheck_core::models::{FeatureId, Rule};
use topocheck_core::GeometryStore;

use super::{Findings, TopologyRule};
use crate::index::{candidate_pairs, point_envelope};

/// Distinct points within `threshold` of each other, exact duplicates included
#[derive(Debug, Clone, Copy)]
pub struct PointProximity {
    threshold: f64,
    strategy: PairStrategy,
}

impl PointProximity {
    pub fn new(threshold: f64, strategy: PairStrategy) -> Self {
        Self { threshold, strategy }
    }
}

impl TopologyRule for PointProximity {
    fn rule(&self) -> Rule {
        Rule::PointProximity
    }

    fn evaluate(&self, store: &GeometryStore) -> Findings {
        let mut findings = Findings::new(self.rule());

        let points: Vec<(FeatureId, Point<f64>)> = store.points().map(|(id, p)| (id, *p)).collect();
        let envelopes: Vec<_> = points.iter().map(|(_, p)| point_envelope(p)).collect();

        for (i, j) in candidate_pairs(&envelopes, self.threshold, self.strategy) {
            let (id_i, p_i) = points[i];
            let (id_j, p_j) = points[j];
            let distance = Euclidean.distance(p_i, p_j);
            if distance <= self.threshold {
                findings.flag_pair(
                    id_i,
                    id_j,
                    format!(
                        "Points are within {} m of each other ({:.3} m)",
                        self.threshold, distance
                    ),
                );
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::points;

    #[test]
    fn test_reference_example() {
        let store = points(&[(0.0, 0.0), (0.0, 0.5), (100.0, 100.0)]);

        for strategy in [PairStrategy::Exhaustive, PairStrategy::Indexed] {
            let findings = PointProximity::new(1.0, strategy).evaluate(&store);
            let flagged: Vec<_> = findings.flagged.iter().collect();
            assert_eq!(flagged, vec![FeatureId(0), FeatureId(1)]);
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let store = points(&[(0.0, 0.0), (1.0, 0.0), (2.5, 0.0)]);
        let findings = PointProximity::new(1.0, PairStrategy::Indexed).evaluate(&store);
        assert_eq!(findings.records.len(), 1);
        assert!(!findings.flagged.contains(FeatureId(2)));
    }

    #[test]
    fn test_duplicates_also_trigger_proximity() {
        let store = points(&[(3.0, 3.0), (3.0, 3.0)]);
        let findings = PointProximity::new(1.0, PairStrategy::Indexed).evaluate(&store);
        assert_eq!(findings.flagged.len(), 2);
    }

    #[test]
    fn test_single_point_has_no_pairs() {
        let store = points(&[(3.0, 3.0)]);
        assert!(PointProximity::new(1.0, PairStrategy::Exhaustive).evaluate(&store).is_empty());
    }
}
