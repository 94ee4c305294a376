//! topocheck geo - Reprojection, candidate pairing, and topology rules
//!
//! This crate holds the validation engine: six independent rules over the
//! point and line partitions of a [`topocheck_core::GeometryStore`], and the
//! validator that runs them and unions their findings.

pub mod index;
pub mod rules;
pub mod transform;
pub mod validator;
pub mod validity;

pub use rules::{Findings, RuleSettings, TopologyRule};
pub use transform::{normalize_dataset, Reprojector};
pub use validator::{RuleSummary, TopologyValidator, ValidationReport, ValidationSettings};
