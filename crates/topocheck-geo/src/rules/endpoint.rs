use geo::{Coord, Distance, Euclidean, LineString, Point};
use topocheck_core::config::PairStrategy;
use topocheck_core::models::{FeatureId, Rule};
use topocheck_core::GeometryStore;

use super::{Findings, TopologyRule};
use crate::index::{candidate_pairs, point_envelope};

/// Terminal coordinate of a line, tagged with its owner. Built per
/// evaluation and dropped afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoint {
    pub owner: FeatureId,
    pub point: Point<f64>,
}

/// Start and end of every line with at least one coordinate, in line order
pub fn endpoints<'a>(
    lines: impl IntoIterator<Item = (FeatureId, &'a LineString<f64>)>,
) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();
    for (owner, line) in lines {
        let (Some(first), Some(last)) = (line.0.first(), line.0.last()) else {
            continue;
        };
        let point = |c: &Coord<f64>| Endpoint { owner, point: Point::from(*c) };
        endpoints.push(point(first));
        endpoints.push(point(last));
    }
    endpoints
}

/// Lines whose endpoints come within `threshold` of another line's endpoints.
/// A line's own start and end are never compared with each other.
#[derive(Debug, Clone, Copy)]
pub struct EndpointProximity {
    threshold: f64,
    strategy: PairStrategy,
}

impl EndpointProximity {
    pub fn new(threshold: f64, strategy: PairStrategy) -> Self {
        Self { threshold, strategy }
    }
}

impl TopologyRule for EndpointProximity {
    fn rule(&self) -> Rule {
        Rule::EndpointProximity
    }

    fn evaluate(&self, store: &GeometryStore) -> Findings {
        let mut findings = Findings::new(self.rule());

        let endpoints = endpoints(store.lines());
        let envelopes: Vec<_> = endpoints.iter().map(|e| point_envelope(&e.point)).collect();

        for (i, j) in candidate_pairs(&envelopes, self.threshold, self.strategy) {
            let (a, b) = (endpoints[i], endpoints[j]);
            if a.owner == b.owner {
                continue;
            }
            let distance = Euclidean.distance(a.point, b.point);
            if distance <= self.threshold {
                findings.flag_pair(
                    a.owner,
                    b.owner,
                    format!("Endpoints are close but not connected ({:.3} m)", distance),
                );
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::lines;

    #[test]
    fn test_reference_example() {
        // Two 10 m lines, end of the first 0.3 m from the start of the second
        let store = lines(vec![vec![(0.0, 0.0), (10.0, 0.0)], vec![(10.3, 0.0), (20.3, 0.0)]]);

        for strategy in [PairStrategy::Exhaustive, PairStrategy::Indexed] {
            let findings = EndpointProximity::new(1.0, strategy).evaluate(&store);
            assert_eq!(findings.flagged.len(), 2);
            assert_eq!(findings.records.len(), 1);
        }
    }

    #[test]
    fn test_own_endpoints_are_not_compared() {
        // Nearly closed loop: its start and end are 0.1 apart
        let store = lines(vec![vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.1)]]);
        assert!(EndpointProximity::new(1.0, PairStrategy::Exhaustive).evaluate(&store).is_empty());
    }

    #[test]
    fn test_connected_endpoints_count_as_close() {
        // Shared endpoint is distance 0
        let store = lines(vec![vec![(0.0, 0.0), (10.0, 0.0)], vec![(10.0, 0.0), (10.0, 10.0)]]);
        let findings = EndpointProximity::new(1.0, PairStrategy::Indexed).evaluate(&store);
        assert_eq!(findings.flagged.len(), 2);
    }

    #[test]
    fn test_endpoints_skip_empty_lines() {
        let a = LineString::from(vec![(0.0, 0.0), (1.0, 0.0)]);
        let empty = LineString::<f64>::new(vec![]);
        let built = endpoints(vec![(FeatureId(0), &a), (FeatureId(1), &empty)]);
        assert_eq!(built.len(), 2);
        assert!(built.iter().all(|e| e.owner == FeatureId(0)));
    }
}
