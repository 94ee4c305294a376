//! In-memory geometry store partitioned by geometry kind.

use geo::{LineString, Point};
use std::collections::HashMap;

use crate::error::{Result, TopoError};
use crate::models::{Crs, ErrorSet, Feature, FeatureGeometry, FeatureId, GeometryKind};

/// Read-only feature collection in a single working CRS.
///
/// Point and line partitions are index lists into `features`, so every view
/// keeps input order and the original identifiers.
#[derive(Debug, Clone)]
pub struct GeometryStore {
    crs: Crs,
    features: Vec<Feature>,
    positions: HashMap<FeatureId, usize>,
    points: Vec<usize>,
    lines: Vec<usize>,
}

impl GeometryStore {
    /// Build a store. Fails if two features share an id.
    pub fn new(crs: Crs, features: Vec<Feature>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(features.len());
        let mut points = Vec::new();
        let mut lines = Vec::new();

        for (pos, feature) in features.iter().enumerate() {
            if positions.insert(feature.id, pos).is_some() {
                return Err(TopoError::DuplicateFeatureId { id: feature.id.to_string() });
            }
            match feature.kind() {
                GeometryKind::Point => points.push(pos),
                GeometryKind::LineString => lines.push(pos),
                GeometryKind::Unsupported => {}
            }
        }

        Ok(Self { crs, features, positions, points, lines })
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// All features in input order
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.positions.get(&id).map(|&pos| &self.features[pos])
    }

    /// Source-file id of a feature, for diagnostics
    pub fn label(&self, id: FeatureId) -> Option<String> {
        self.get(id).and_then(Feature::label_text)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Point partition in input order
    pub fn points(&self) -> impl Iterator<Item = (FeatureId, &Point<f64>)> + '_ {
        self.points.iter().filter_map(move |&pos| {
            let feature = &self.features[pos];
            match &feature.geometry {
                FeatureGeometry::Point(p) => Some((feature.id, p)),
                _ => None,
            }
        })
    }

    /// LineString partition in input order
    pub fn lines(&self) -> impl Iterator<Item = (FeatureId, &LineString<f64>)> + '_ {
        self.lines.iter().filter_map(move |&pos| {
            let feature = &self.features[pos];
            match &feature.geometry {
                FeatureGeometry::LineString(ls) => Some((feature.id, ls)),
                _ => None,
            }
        })
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn unsupported_count(&self) -> usize {
        self.features.len() - self.points.len() - self.lines.len()
    }

    /// Reject collections made up mostly of kinds that are never validated.
    /// An empty collection passes.
    pub fn check_supported_share(&self) -> Result<()> {
        let unsupported = self.unsupported_count();
        if unsupported * 2 > self.features.len() {
            return Err(TopoError::UnsupportedGeometry { unsupported, total: self.features.len() });
        }
        Ok(())
    }

    /// Features whose id is in `errors`, in input order
    pub fn project(&self, errors: &ErrorSet) -> Vec<&Feature> {
        self.features.iter().filter(|f| errors.contains(f.id)).collect()
    }
}
