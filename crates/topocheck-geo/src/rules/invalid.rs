use topocheck_core::models::Rule;
use topocheck_core::GeometryStore;

use super::{Findings, TopologyRule};
use crate::validity::validate_linestring;

/// Line strings that are not valid simple lines
#[derive(Debug, Clone, Copy, Default)]
pub struct InvalidLines;

impl TopologyRule for InvalidLines {
    fn rule(&self) -> Rule {
        Rule::InvalidLine
    }

    fn evaluate(&self, store: &GeometryStore) -> Findings {
        let mut findings = Findings::new(self.rule());

        for (id, line) in store.lines() {
            let result = validate_linestring(line);
            if let Some(summary) = result.summary() {
                findings.flag(id, format!("Invalid linestring: {}", summary));
            }
        }

        findings
    }
}
