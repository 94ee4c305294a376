//! Domain models

pub mod crs;
pub mod feature;
pub mod findings;

pub use crs::Crs;
pub use feature::{ExtraOrdinates, Feature, FeatureGeometry, FeatureId, GeometryKind};
pub use findings::{ErrorRecord, ErrorSet, Rule};
