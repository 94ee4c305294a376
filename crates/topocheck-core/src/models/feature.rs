//! Feature model bridging GeoJSON records and `geo` geometries.

use geo::{Coord, LineString, Point};
use geojson::feature::Id;
use geojson::{JsonObject, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TopoError};

/// Stable feature identifier: the zero-based position in the input collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub usize);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geometry kind classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    /// Absent geometry or any other GeoJSON type. Never validated.
    Unsupported,
}

/// Feature geometry. Points and line strings are held as `geo` types in the
/// working CRS; everything else is carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Point(Point<f64>),
    LineString(LineString<f64>),
    Other(Option<geojson::Geometry>),
}

impl FeatureGeometry {
    /// Convert a GeoJSON geometry
    pub fn from_geojson(geometry: Option<&geojson::Geometry>) -> Result<Self> {
        let Some(geometry) = geometry else {
            return Ok(FeatureGeometry::Other(None));
        };

        match &geometry.value {
            Value::Point(position) => {
                let coord = position_to_coord(position)?;
                Ok(FeatureGeometry::Point(Point::from(coord)))
            }
            Value::LineString(positions) => {
                let coords: Result<Vec<Coord<f64>>> =
                    positions.iter().map(|p| position_to_coord(p)).collect();
                Ok(FeatureGeometry::LineString(LineString::new(coords?)))
            }
            _ => Ok(FeatureGeometry::Other(Some(geometry.clone()))),
        }
    }

    /// Convert back to GeoJSON, appending `ordinates` to each position
    pub fn to_geojson(&self, ordinates: &ExtraOrdinates) -> Option<geojson::Geometry> {
        let position = |i: usize, c: Coord<f64>| {
            let mut position = vec![c.x, c.y];
            position.extend_from_slice(ordinates.at(i));
            position
        };
        match self {
            FeatureGeometry::Point(p) => {
                Some(geojson::Geometry::new(Value::Point(position(0, p.0))))
            }
            FeatureGeometry::LineString(ls) => Some(geojson::Geometry::new(Value::LineString(
                ls.coords().enumerate().map(|(i, c)| position(i, *c)).collect(),
            ))),
            FeatureGeometry::Other(raw) => raw.clone(),
        }
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            FeatureGeometry::Point(_) => GeometryKind::Point,
            FeatureGeometry::LineString(_) => GeometryKind::LineString,
            FeatureGeometry::Other(_) => GeometryKind::Unsupported,
        }
    }
}

fn position_to_coord(position: &[f64]) -> Result<Coord<f64>> {
    match position {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(TopoError::Parse {
            format: "GeoJSON".to_string(),
            reason: format!("Position needs at least 2 values, found {}", position.len()),
        }),
    }
}

/// Ordinates after x and y (elevation, measure) for each position of a
/// point or line string. Empty when every source position is 2D.
///
/// Reprojection is horizontal only, so these pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraOrdinates(Vec<Vec<f64>>);

impl ExtraOrdinates {
    /// Collect the ordinates past x and y of a Point or LineString
    pub fn from_geojson(geometry: Option<&geojson::Geometry>) -> Self {
        let positions: Vec<&Vec<f64>> = match geometry.map(|g| &g.value) {
            Some(Value::Point(position)) => vec![position],
            Some(Value::LineString(positions)) => positions.iter().collect(),
            _ => return Self::default(),
        };
        if positions.iter().all(|p| p.len() <= 2) {
            return Self::default();
        }
        Self(positions.into_iter().map(|p| p.get(2..).unwrap_or_default().to_vec()).collect())
    }

    /// Extra ordinates of position `index`; empty when there are none
    pub fn at(&self, index: usize) -> &[f64] {
        self.0.get(index).map(Vec::as_slice).unwrap_or_default()
    }
}

/// A geometric record
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: FeatureId,

    /// Identifier carried by the source file, if any
    pub label: Option<Id>,

    pub geometry: FeatureGeometry,

    /// Elevation and other ordinates beyond x and y
    pub ordinates: ExtraOrdinates,

    /// Original attributes, written back unchanged
    pub properties: Option<JsonObject>,
}

impl Feature {
    pub fn new(id: usize, geometry: FeatureGeometry) -> Self {
        Self {
            id: FeatureId(id),
            label: None,
            geometry,
            ordinates: ExtraOrdinates::default(),
            properties: None,
        }
    }

    /// Build a feature from a GeoJSON geometry, keeping any extra ordinates
    pub fn from_geojson(id: usize, geometry: Option<&geojson::Geometry>) -> Result<Self> {
        let mut feature = Self::new(id, FeatureGeometry::from_geojson(geometry)?);
        feature.ordinates = ExtraOrdinates::from_geojson(geometry);
        Ok(feature)
    }

    /// GeoJSON geometry for output, extra ordinates included
    pub fn to_geojson_geometry(&self) -> Option<geojson::Geometry> {
        self.geometry.to_geojson(&self.ordinates)
    }

    pub fn point(id: usize, x: f64, y: f64) -> Self {
        Self::new(id, FeatureGeometry::Point(Point::new(x, y)))
    }

    pub fn line_string(id: usize, coords: Vec<(f64, f64)>) -> Self {
        Self::new(id, FeatureGeometry::LineString(LineString::from(coords)))
    }

    pub fn kind(&self) -> GeometryKind {
        self.geometry.kind()
    }

    /// Source-file id as text, if the feature had one
    pub fn label_text(&self) -> Option<String> {
        match &self.label {
            Some(Id::String(s)) => Some(s.clone()),
            Some(Id::Number(n)) => Some(n.to_string()),
            None => None,
        }
    }
}
