//! Topology rules
//!
//! Each rule is a pure function of the geometry store: it reads one
//! partition and returns the ids it flags together with one diagnostic
//! record per violation. Rules never see each other's output.

use topocheck_core::config::PairStrategy;
use topocheck_core::models::{ErrorRecord, ErrorSet, FeatureId, Rule};
use topocheck_core::GeometryStore;

mod duplicate;
mod endpoint;
mod intersection;
mod invalid;
mod near_miss;
mod proximity;

pub use duplicate::DuplicatePoints;
pub use endpoint::EndpointProximity;
pub use intersection::LineIntersections;
pub use invalid::InvalidLines;
pub use near_miss::LineNearMisses;
pub use proximity::PointProximity;

/// A single topology check
pub trait TopologyRule: Send + Sync {
    /// Which rule this is
    fn rule(&self) -> Rule;

    /// Evaluate the rule over the store
    fn evaluate(&self, store: &GeometryStore) -> Findings;
}

/// Output of one rule
#[derive(Debug, Clone, PartialEq)]
pub struct Findings {
    pub rule: Rule,
    pub flagged: ErrorSet,
    pub records: Vec<ErrorRecord>,
}

impl Findings {
    pub fn new(rule: Rule) -> Self {
        Self { rule, flagged: ErrorSet::new(), records: Vec::new() }
    }

    /// Flag a single feature
    pub fn flag(&mut self, id: FeatureId, message: impl Into<String>) {
        self.flagged.insert(id);
        self.records.push(ErrorRecord::single(self.rule, id, message));
    }

    /// Flag both members of a pair
    pub fn flag_pair(&mut self, a: FeatureId, b: FeatureId, message: impl Into<String>) {
        self.flagged.insert(a);
        self.flagged.insert(b);
        self.records.push(ErrorRecord::pair(self.rule, a, b, message));
    }

    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }
}

/// Thresholds and pairing strategy shared by the rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleSettings {
    pub point_threshold: f64,
    pub line_threshold: f64,
    pub endpoint_threshold: f64,
    pub strategy: PairStrategy,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            point_threshold: 1.0,
            line_threshold: 1.0,
            endpoint_threshold: 1.0,
            strategy: PairStrategy::default(),
        }
    }
}

/// The full rule set in evaluation order
pub fn default_rules(settings: &RuleSettings) -> Vec<Box<dyn TopologyRule>> {
    vec![
        Box::new(DuplicatePoints),
        Box::new(PointProximity::new(settings.point_threshold, settings.strategy)),
        Box::new(InvalidLines),
        Box::new(LineIntersections::new(settings.strategy)),
        Box::new(LineNearMisses::new(settings.line_threshold, settings.strategy)),
        Box::new(EndpointProximity::new(settings.endpoint_threshold, settings.strategy)),
    ]
}
