//! CRS transformation and normalization

use geo::{Coord, LineString, Point};
use proj::Proj;
use topocheck_core::config::LayeredConfig;
use topocheck_core::error::{Result, TopoError};
use topocheck_core::formats::FormatDataset;
use topocheck_core::models::{Crs, Feature, FeatureGeometry};
use topocheck_core::GeometryStore;

/// Check if two CRS are the same
pub fn crs_match(crs1: &Crs, crs2: &Crs) -> bool {
    crs1.epsg == crs2.epsg
}

/// Coordinate transformer between two CRS. Identity when they match.
pub struct Reprojector {
    from: Crs,
    to: Crs,
    proj: Option<Proj>,
}

impl Reprojector {
    pub fn new(from: &Crs, to: &Crs) -> Result<Self> {
        let proj = if crs_match(from, to) {
            None
        } else {
            let from_proj = format!("EPSG:{}", from.epsg);
            let to_proj = format!("EPSG:{}", to.epsg);
            let proj = Proj::new_known_crs(&from_proj, &to_proj, None).map_err(|e| {
                TopoError::Projection {
                    from: from_proj.clone(),
                    to: to_proj.clone(),
                    reason: format!("Failed to create projection: {}", e),
                }
            })?;
            Some(proj)
        };

        Ok(Self { from: from.clone(), to: to.clone(), proj })
    }

    pub fn is_identity(&self) -> bool {
        self.proj.is_none()
    }

    fn projection_error(&self, reason: impl Into<String>) -> TopoError {
        TopoError::Projection {
            from: format!("EPSG:{}", self.from.epsg),
            to: format!("EPSG:{}", self.to.epsg),
            reason: reason.into(),
        }
    }

    /// Transform a single coordinate
    pub fn convert(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let Some(proj) = &self.proj else {
            return Ok(coord);
        };

        let (x, y) = proj
            .convert((coord.x, coord.y))
            .map_err(|e| self.projection_error(format!("Projection failed: {}", e)))?;

        if !x.is_finite() || !y.is_finite() {
            return Err(self.projection_error(format!(
                "({}, {}) is outside the domain of the target CRS",
                coord.x, coord.y
            )));
        }
        Ok(Coord { x, y })
    }

    /// Transform a feature geometry. Unsupported kinds pass through untouched.
    pub fn reproject_geometry(&self, geometry: FeatureGeometry) -> Result<FeatureGeometry> {
        if self.is_identity() {
            return Ok(geometry);
        }

        match geometry {
            FeatureGeometry::Point(p) => {
                Ok(FeatureGeometry::Point(Point::from(self.convert(p.0)?)))
            }
            FeatureGeometry::LineString(ls) => {
                let coords: Result<Vec<_>> = ls.0.into_iter().map(|c| self.convert(c)).collect();
                Ok(FeatureGeometry::LineString(LineString::new(coords?)))
            }
            other @ FeatureGeometry::Other(_) => Ok(other),
        }
    }

    /// Reproject x and y. Elevation and other ordinates are left as they are.
    pub fn reproject_feature(&self, mut feature: Feature) -> Result<Feature> {
        feature.geometry = self.reproject_geometry(feature.geometry)?;
        Ok(feature)
    }
}

/// Reproject a freshly read dataset into the working CRS and build the store.
///
/// Input without a CRS declaration is taken to be in the configured source
/// CRS. Fails if most features are of kinds that are never validated.
pub fn normalize_dataset(dataset: FormatDataset, config: &LayeredConfig) -> Result<GeometryStore> {
    let source = match dataset.crs {
        Some(crs) => crs,
        None => {
            let assumed = Crs::from_epsg(config.source_crs.value);
            tracing::info!("{} declares no CRS, assuming {}", dataset.name, assumed);
            assumed
        }
    };
    let target = Crs::from_epsg(config.target_crs.value);

    let reprojector = Reprojector::new(&source, &target)?;
    if !reprojector.is_identity() {
        tracing::info!("Reprojecting {} from {} to {}", dataset.name, source, target);
    }

    let features = dataset
        .features
        .into_iter()
        .map(|f| reprojector.reproject_feature(f))
        .collect::<Result<Vec<_>>>()?;

    let store = GeometryStore::new(target, features)?;
    store.check_supported_share()?;

    tracing::info!(
        "Loaded {} features: {} points, {} linestrings, {} ignored",
        store.len(),
        store.point_count(),
        store.line_count(),
        store.unsupported_count()
    );

    Ok(store)
}
