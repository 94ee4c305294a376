//! GeoJSON reader and writer

use async_trait::async_trait;
use geojson::{FeatureCollection, GeoJson, JsonObject};
use std::fs;
use std::path::Path;

use crate::error::{Result, TopoError};
use crate::formats::{FormatDataset, FormatReader, FormatValidation};
use crate::models::{Crs, Feature};

/// GeoJSON format reader
pub struct GeoJsonReader;

#[async_trait]
impl FormatReader for GeoJsonReader {
    async fn read(&self, path: &Path) -> Result<FormatDataset> {
        if !path.exists() {
            return Err(TopoError::InputNotFound { path: path.to_path_buf() });
        }
        let content = fs::read_to_string(path)?;

        let geojson: GeoJson = content.parse().map_err(|e| TopoError::Parse {
            format: "GeoJSON".to_string(),
            reason: format!("Failed to parse GeoJSON: {}", e),
        })?;

        let (features, crs) = extract_features_and_crs(geojson)?;

        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("unnamed").to_string();

        tracing::info!("Read {} features from {}", features.len(), path.display());

        Ok(FormatDataset { name, format_name: self.format_name().to_string(), crs, features })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json", "geojson"]
    }

    fn format_name(&self) -> &str {
        "GeoJSON"
    }

    async fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let mut validation = FormatValidation::default();

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                validation.errors.push(format!("Cannot read file {}: {}", path.display(), e));
                return Ok(validation);
            }
        };

        match content.parse::<GeoJson>() {
            Ok(geojson) => match declared_crs(foreign_members(&geojson)) {
                Ok(None) => validation
                    .warnings
                    .push("No CRS declared; the configured source CRS will be assumed".into()),
                Ok(Some(_)) => {}
                Err(e) => validation.errors.push(e.to_string()),
            },
            Err(e) => validation.errors.push(format!("Invalid GeoJSON: {}", e)),
        }

        Ok(validation)
    }
}

/// Extract features and the declared CRS
fn extract_features_and_crs(geojson: GeoJson) -> Result<(Vec<Feature>, Option<Crs>)> {
    let crs = declared_crs(foreign_members(&geojson))?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc
            .features
            .into_iter()
            .enumerate()
            .map(|(idx, feature)| convert_feature(feature, idx))
            .collect::<Result<Vec<_>>>()?,
        GeoJson::Feature(feature) => vec![convert_feature(feature, 0)?],
        GeoJson::Geometry(geometry) => vec![Feature::from_geojson(0, Some(&geometry))?],
    };

    Ok((features, crs))
}

/// Foreign members of the top-level object
fn foreign_members(geojson: &GeoJson) -> Option<&JsonObject> {
    match geojson {
        GeoJson::FeatureCollection(fc) => fc.foreign_members.as_ref(),
        GeoJson::Feature(feature) => feature.foreign_members.as_ref(),
        GeoJson::Geometry(geometry) => geometry.foreign_members.as_ref(),
    }
}

/// CRS named by a `crs` member, if there is one
fn declared_crs(members: Option<&JsonObject>) -> Result<Option<Crs>> {
    members.and_then(|fm| fm.get("crs")).map(parse_crs_member).transpose()
}

fn convert_feature(feature: geojson::Feature, idx: usize) -> Result<Feature> {
    let mut converted = Feature::from_geojson(idx, feature.geometry.as_ref())?;
    converted.label = feature.id;
    converted.properties = feature.properties;
    Ok(converted)
}

/// Parse a legacy `crs` member: `{"type": "name", "properties": {"name": "EPSG:25832"}}`
fn parse_crs_member(crs: &serde_json::Value) -> Result<Crs> {
    let name = crs
        .get("properties")
        .and_then(|props| props.get("name"))
        .and_then(|name| name.as_str())
        .ok_or_else(|| TopoError::InvalidCrs { value: crs.to_string() })?;
    Crs::from_declaration(name)
}

/// GeoJSON writer for flagged features
pub struct GeoJsonWriter;

impl GeoJsonWriter {
    /// Build a FeatureCollection tagged with the working CRS
    pub fn to_feature_collection(features: &[&Feature], crs: &Crs) -> FeatureCollection {
        let features = features
            .iter()
            .map(|feature| geojson::Feature {
                bbox: None,
                geometry: feature.to_geojson_geometry(),
                id: feature.label.clone(),
                properties: feature.properties.clone(),
                foreign_members: None,
            })
            .collect();

        let mut foreign_members = JsonObject::new();
        foreign_members.insert(
            "crs".to_string(),
            serde_json::json!({
                "type": "name",
                "properties": { "name": crs.urn() }
            }),
        );

        FeatureCollection { bbox: None, features, foreign_members: Some(foreign_members) }
    }

    /// Write features to `path`. An empty slice yields an empty collection.
    pub fn write(path: &Path, features: &[&Feature], crs: &Crs) -> Result<()> {
        let collection = Self::to_feature_collection(features, crs);
        let json = serde_json::to_string_pretty(&collection)
            .map_err(|e| TopoError::Serialization(format!("Failed to serialize output: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;

        tracing::info!("Wrote {} features to {}", features.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeatureId, GeometryKind};

    fn write_temp(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("test.geojson");
        fs::write(&file_path, content).unwrap();
        (temp_dir, file_path)
    }

    #[tokio::test]
    async fn test_reader_feature_collection() {
        let (_dir, path) = write_temp(
            r#"{
            "type": "FeatureCollection",
            "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:EPSG::25832" } },
            "features": [
                {
                    "type": "Feature",
                    "id": "valve-1",
                    "geometry": { "type": "Point", "coordinates": [500000.0, 6200000.0] },
                    "properties": { "material": "steel" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [10.0, 0.0]] },
                    "properties": null
                }
            ]
        }"#,
        );

        let result = GeoJsonReader.read(&path).await.unwrap();

        assert_eq!(result.name, "test");
        assert_eq!(result.crs.unwrap().epsg, 25832);
        assert_eq!(result.features.len(), 2);
        assert_eq!(result.features[0].id, FeatureId(0));
        assert_eq!(result.features[0].label_text().as_deref(), Some("valve-1"));
        assert_eq!(result.features[1].kind(), GeometryKind::LineString);
    }

    #[tokio::test]
    async fn test_reader_without_crs() {
        let (_dir, path) = write_temp(
            r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}, "properties": {}}"#,
        );

        let result = GeoJsonReader.read(&path).await.unwrap();
        assert!(result.crs.is_none());
        assert_eq!(result.features.len(), 1);
    }

    #[tokio::test]
    async fn test_reader_single_feature_with_crs() {
        let (_dir, path) = write_temp(
            r#"{"type": "Feature",
                "crs": {"type": "name", "properties": {"name": "EPSG:25833"}},
                "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
                "properties": {}}"#,
        );

        let result = GeoJsonReader.read(&path).await.unwrap();
        assert_eq!(result.crs.unwrap().epsg, 25833);

        let validation = GeoJsonReader.validate(&path).await.unwrap();
        assert!(!validation.has_warnings());
    }

    #[tokio::test]
    async fn test_reader_bare_geometry_with_crs() {
        let (_dir, path) = write_temp(
            r#"{"type": "LineString",
                "crs": {"type": "name", "properties": {"name": "EPSG:25832"}},
                "coordinates": [[0.0, 0.0], [1.0, 1.0]]}"#,
        );

        let result = GeoJsonReader.read(&path).await.unwrap();
        assert_eq!(result.crs.unwrap().epsg, 25832);
        assert_eq!(result.features[0].kind(), GeometryKind::LineString);
    }

    #[tokio::test]
    async fn test_elevation_survives_read_and_write() {
        let (dir, path) = write_temp(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Point", "coordinates": [1.0, 2.0, 10.0]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0, 3.5], [4.0, 0.0, 7.25]]}}
            ]}"#,
        );

        let dataset = GeoJsonReader.read(&path).await.unwrap();
        let features: Vec<&Feature> = dataset.features.iter().collect();
        let out = dir.path().join("out.geojson");
        GeoJsonWriter::write(&out, &features, &Crs::default()).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(
            written["features"][0]["geometry"]["coordinates"],
            serde_json::json!([1.0, 2.0, 10.0])
        );
        assert_eq!(
            written["features"][1]["geometry"]["coordinates"],
            serde_json::json!([[0.0, 0.0, 3.5], [4.0, 0.0, 7.25]])
        );
    }

    #[tokio::test]
    async fn test_reader_rejects_unknown_crs() {
        let (_dir, path) = write_temp(
            r#"{"type": "FeatureCollection",
                "crs": {"type": "name", "properties": {"name": "local grid"}},
                "features": []}"#,
        );

        let result = GeoJsonReader.read(&path).await;
        assert!(matches!(result, Err(TopoError::InvalidCrs { .. })));
    }

    #[tokio::test]
    async fn test_reader_missing_file() {
        let result = GeoJsonReader.read(Path::new("/nonexistent/in.geojson")).await;
        assert!(matches!(result, Err(TopoError::InputNotFound { .. })));
    }

    #[tokio::test]
    async fn test_validation() {
        let (_dir, path) = write_temp("not valid json");
        let validation = GeoJsonReader.validate(&path).await.unwrap();
        assert!(!validation.is_valid());

        let (_dir, path) = write_temp(r#"{"type": "FeatureCollection", "features": []}"#);
        let validation = GeoJsonReader.validate(&path).await.unwrap();
        assert!(validation.is_valid());
        assert!(validation.has_warnings());
    }

    #[test]
    fn test_writer_keeps_ids_and_properties() {
        let mut feature = Feature::point(3, 1.0, 2.0);
        feature.label = Some(geojson::feature::Id::String("hydrant-7".to_string()));
        let mut props = JsonObject::new();
        props.insert("status".to_string(), serde_json::json!("active"));
        feature.properties = Some(props);

        let collection =
            GeoJsonWriter::to_feature_collection(&[&feature], &Crs::etrs89_utm32n());
        let json = serde_json::to_value(&collection).unwrap();

        assert_eq!(json["features"][0]["id"], "hydrant-7");
        assert_eq!(json["features"][0]["properties"]["status"], "active");
        assert_eq!(json["features"][0]["geometry"]["coordinates"][1], 2.0);
        assert_eq!(json["crs"]["properties"]["name"], "urn:ogc:def:crs:EPSG::25832");
    }

    #[test]
    fn test_writer_empty_collection() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out").join("errors.geojson");

        GeoJsonWriter::write(&path, &[], &Crs::default()).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["type"], "FeatureCollection");
        assert_eq!(written["features"].as_array().unwrap().len(), 0);
    }
}
