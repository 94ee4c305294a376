use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TopoError};

/// Widely used geographic (degree-based) EPSG codes, 2D and 3D
const GEOGRAPHIC_EPSG: &[u32] =
    &[4326, 4979, 4258, 4937, 4269, 4283, 7844, 4167, 4612, 6668, 4674, 4490];

/// Coordinate Reference System identified by EPSG code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: u32,
    pub name: String,
}

impl Default for Crs {
    fn default() -> Self {
        Self::etrs89_utm32n()
    }
}

impl Crs {
    pub fn new(epsg: u32, name: impl Into<String>) -> Self {
        Self { epsg, name: name.into() }
    }

    /// Build a CRS from a bare EPSG code, naming the well-known ones
    pub fn from_epsg(epsg: u32) -> Self {
        match epsg {
            4326 => Self::wgs84(),
            25832 => Self::etrs89_utm32n(),
            3857 => Self::new(3857, "Web Mercator"),
            _ => Self::new(epsg, format!("EPSG:{}", epsg)),
        }
    }

    /// WGS 84 (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::new(4326, "WGS 84")
    }

    /// ETRS89 / UTM zone 32N (EPSG:25832), metric
    pub fn etrs89_utm32n() -> Self {
        Self::new(25832, "ETRS89 / UTM zone 32N")
    }

    /// Parse a legacy GeoJSON `crs.properties.name` value.
    ///
    /// Accepts `EPSG:25832`, `urn:ogc:def:crs:EPSG::25832` and the OGC CRS84
    /// URN, which is WGS 84 with lon/lat axis order.
    pub fn from_declaration(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.ends_with("CRS84") {
            return Ok(Self::wgs84());
        }

        let is_epsg = trimmed.to_ascii_uppercase().contains("EPSG");
        trimmed
            .rsplit(':')
            .next()
            .filter(|_| is_epsg)
            .and_then(|code| code.parse::<u32>().ok())
            .map(Self::from_epsg)
            .ok_or_else(|| TopoError::InvalidCrs { value: value.to_string() })
    }

    /// True for well-known geographic CRSs, whose units are degrees
    pub fn is_geographic(&self) -> bool {
        GEOGRAPHIC_EPSG.contains(&self.epsg)
    }

    /// The URN written into output files
    pub fn urn(&self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.epsg)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{} ({})", self.epsg, self.name)
    }
}
