//! Runs the rule set over a store and merges the findings.

use rayon::prelude::*;
use serde::Serialize;
use topocheck_core::config::LayeredConfig;
use topocheck_core::models::{ErrorRecord, ErrorSet, Feature, Rule};
use topocheck_core::GeometryStore;

use crate::rules::{default_rules, Findings, RuleSettings, TopologyRule};

/// Validator settings derived from configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ValidationSettings {
    pub rules: RuleSettings,
    /// Evaluate rules on the rayon thread pool
    pub parallel: bool,
}

impl ValidationSettings {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            rules: RuleSettings {
                point_threshold: config.point_threshold.value,
                line_threshold: config.line_threshold.value,
                endpoint_threshold: config.effective_endpoint_threshold(),
                strategy: config.pair_strategy.value,
            },
            parallel: config.parallel.value,
        }
    }
}

/// Per-rule counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSummary {
    pub rule: Rule,
    /// Diagnostic records emitted
    pub violations: usize,
    /// Distinct features flagged by this rule
    pub flagged: usize,
}

/// Merged result of a validation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: ErrorSet,
    pub records: Vec<ErrorRecord>,
    pub summary: Vec<RuleSummary>,
}

impl ValidationReport {
    /// Union findings in the order given
    pub fn merge(findings: Vec<Findings>) -> Self {
        let mut errors = ErrorSet::new();
        let mut records = Vec::new();
        let mut summary = Vec::with_capacity(findings.len());

        for f in findings {
            summary.push(RuleSummary {
                rule: f.rule,
                violations: f.records.len(),
                flagged: f.flagged.len(),
            });
            errors.union_with(&f.flagged);
            records.extend(f.records);
        }

        Self { errors, records, summary }
    }

    /// Features to report, in input order
    pub fn project<'a>(&self, store: &'a GeometryStore) -> Vec<&'a Feature> {
        store.project(&self.errors)
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Topology validator
pub struct TopologyValidator {
    rules: Vec<Box<dyn TopologyRule>>,
    parallel: bool,
}

impl TopologyValidator {
    /// Validator with the full rule set
    pub fn from_settings(settings: ValidationSettings) -> Self {
        Self { rules: default_rules(&settings.rules), parallel: settings.parallel }
    }

    /// Validator with a custom rule set
    pub fn with_rules(rules: Vec<Box<dyn TopologyRule>>) -> Self {
        Self { rules, parallel: false }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Evaluate every rule and merge the results. The store is only read.
    pub fn run(&self, store: &GeometryStore) -> ValidationReport {
        tracing::info!(
            "Validating {} points and {} linestrings with {} rules",
            store.point_count(),
            store.line_count(),
            self.rules.len()
        );

        let findings: Vec<Findings> = if self.parallel {
            self.rules.par_iter().map(|rule| rule.evaluate(store)).collect()
        } else {
            self.rules.iter().map(|rule| rule.evaluate(store)).collect()
        };

        let mut report = ValidationReport::merge(findings);
        for record in &mut report.records {
            record.resolve_labels(|id| store.label(id));
            tracing::warn!("{}", record);
        }
        for summary in &report.summary {
            tracing::info!("{}: {} features flagged", summary.rule, summary.flagged);
        }

        tracing::info!("Total geometries with errors: {}", report.errors.len());
        report
    }
}
