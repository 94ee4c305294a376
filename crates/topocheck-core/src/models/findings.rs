//! Validation findings: rule names, diagnostic records and the error set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::feature::FeatureId;

/// Topology rule identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    DuplicatePoint,
    PointProximity,
    InvalidLine,
    LineIntersection,
    LineNearMiss,
    EndpointProximity,
}

impl Rule {
    pub const ALL: [Rule; 6] = [
        Rule::DuplicatePoint,
        Rule::PointProximity,
        Rule::InvalidLine,
        Rule::LineIntersection,
        Rule::LineNearMiss,
        Rule::EndpointProximity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Rule::DuplicatePoint => "duplicate_point",
            Rule::PointProximity => "point_proximity",
            Rule::InvalidLine => "invalid_line",
            Rule::LineIntersection => "line_intersection",
            Rule::LineNearMiss => "line_near_miss",
            Rule::EndpointProximity => "endpoint_proximity",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Diagnostic tuple produced by a rule. Used for logging and reports only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub rule: Rule,
    pub feature_a: FeatureId,
    pub feature_b: Option<FeatureId>,
    pub message: String,

    /// Source-file ids of the features, when they carry one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_a: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_b: Option<String>,
}

impl ErrorRecord {
    pub fn single(rule: Rule, feature: FeatureId, message: impl Into<String>) -> Self {
        Self {
            rule,
            feature_a: feature,
            feature_b: None,
            message: message.into(),
            label_a: None,
            label_b: None,
        }
    }

    pub fn pair(rule: Rule, a: FeatureId, b: FeatureId, message: impl Into<String>) -> Self {
        Self {
            rule,
            feature_a: a,
            feature_b: Some(b),
            message: message.into(),
            label_a: None,
            label_b: None,
        }
    }

    /// Attach source-file ids looked up by `resolve`
    pub fn resolve_labels(&mut self, resolve: impl Fn(FeatureId) -> Option<String>) {
        self.label_a = resolve(self.feature_a);
        self.label_b = self.feature_b.and_then(&resolve);
    }
}

fn feature_name(id: FeatureId, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{} (#{})", label, id),
        None => format!("#{}", id),
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = feature_name(self.feature_a, self.label_a.as_deref());
        match self.feature_b {
            Some(b) => {
                let b = feature_name(b, self.label_b.as_deref());
                write!(f, "[{}] {} and {}: {}", self.rule, a, b, self.message)
            }
            None => write!(f, "[{}] {}: {}", self.rule, a, self.message),
        }
    }
}

/// Set of flagged feature ids. It only grows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorSet(BTreeSet<FeatureId>);

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the id was not already flagged
    pub fn insert(&mut self, id: FeatureId) -> bool {
        self.0.insert(id)
    }

    pub fn union_with(&mut self, other: &ErrorSet) {
        self.0.extend(other.0.iter().copied());
    }

    pub fn contains(&self, id: FeatureId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = FeatureId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<FeatureId> for ErrorSet {
    fn from_iter<I: IntoIterator<Item = FeatureId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_is_order_independent() {
        let a: ErrorSet = [FeatureId(1), FeatureId(3)].into_iter().collect();
        let b: ErrorSet = [FeatureId(3), FeatureId(2)].into_iter().collect();

        let mut ab = a.clone();
        ab.union_with(&b);
        let mut ba = b.clone();
        ba.union_with(&a);

        assert_eq!(ab, ba);
        assert_eq!(ab.iter().collect::<Vec<_>>(), vec![FeatureId(1), FeatureId(2), FeatureId(3)]);
    }

    #[test]
    fn test_insert_reports_novelty() {
        let mut set = ErrorSet::new();
        assert!(set.insert(FeatureId(0)));
        assert!(!set.insert(FeatureId(0)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_rule_serializes_snake_case() {
        let json = serde_json::to_string(&Rule::EndpointProximity).unwrap();
        assert_eq!(json, "\"endpoint_proximity\"");
    }

    #[test]
    fn test_record_display() {
        let record = ErrorRecord::pair(
            Rule::LineIntersection,
            FeatureId(2),
            FeatureId(5),
            "Lines intersect",
        );
        assert_eq!(record.to_string(), "[line_intersection] #2 and #5: Lines intersect");
    }

    #[test]
    fn test_record_labels() {
        let mut record =
            ErrorRecord::pair(Rule::PointProximity, FeatureId(0), FeatureId(1), "Too close");
        record.resolve_labels(|id| (id == FeatureId(1)).then(|| "valve-9".to_string()));

        assert_eq!(record.to_string(), "[point_proximity] #0 and valve-9 (#1): Too close");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["label_b"], "valve-9");
        assert!(json.get("label_a").is_none());
    }
}
