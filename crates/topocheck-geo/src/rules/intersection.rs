use geo::{Intersects, LineString};
use topocheck_core::config::PairStrategy;
use topocheck_core::models::{FeatureId, Rule};
use topocheck_core::GeometryStore;

use super::{Findings, TopologyRule};
use crate::index::{candidate_pairs, line_envelope};

/// Distinct line strings sharing at least one point
#[derive(Debug, Clone, Copy)]
pub struct LineIntersections {
    strategy: PairStrategy,
}

impl LineIntersections {
    pub fn new(strategy: PairStrategy) -> Self {
        Self { strategy }
    }
}

impl TopologyRule for LineIntersections {
    fn rule(&self) -> Rule {
        Rule::LineIntersection
    }

    fn evaluate(&self, store: &GeometryStore) -> Findings {
        let mut findings = Findings::new(self.rule());

        let lines: Vec<(FeatureId, &LineString<f64>)> = store.lines().collect();
        let envelopes: Vec<_> = lines.iter().map(|(_, l)| line_envelope(l)).collect();

        for (i, j) in candidate_pairs(&envelopes, 0.0, self.strategy) {
            let (id_i, line_i) = lines[i];
            let (id_j, line_j) = lines[j];
            if line_i.intersects(line_j) {
                findings.flag_pair(id_i, id_j, "Lines intersect");
            }
        }

        findings
    }
}
