//! Format abstraction layer
//!
//! Readers turn a file into a [`FormatDataset`] whose features are still in
//! the CRS the file declares. The `FormatRegistry` picks a reader by file
//! extension.

use async_trait::async_trait;
use std::path::Path;

use crate::error::{Result, TopoError};
use crate::models::{Crs, Feature, GeometryKind};

pub mod geojson;

/// Format reader trait that all format implementations must implement
#[async_trait]
pub trait FormatReader: Send + Sync {
    /// Read a dataset from the given path
    async fn read(&self, path: &Path) -> Result<FormatDataset>;

    /// Get supported file extensions (e.g., ["geojson"])
    fn supported_extensions(&self) -> &[&str];

    /// Get human-readable format name
    fn format_name(&self) -> &str;

    /// Validate file structure without full read
    async fn validate(&self, _path: &Path) -> Result<FormatValidation> {
        Ok(FormatValidation::default())
    }
}

/// Result of format validation
#[derive(Debug, Clone, Default)]
pub struct FormatValidation {
    /// Validation errors that prevent reading
    pub errors: Vec<String>,

    /// Warnings that don't prevent reading but indicate potential issues
    pub warnings: Vec<String>,
}

impl FormatValidation {
    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Dataset as read from disk, before reprojection
#[derive(Debug, Clone)]
pub struct FormatDataset {
    /// Dataset name (file stem)
    pub name: String,

    pub format_name: String,

    /// CRS declared by the file, if any
    pub crs: Option<Crs>,

    /// Features with ids assigned in input order
    pub features: Vec<Feature>,
}

impl FormatDataset {
    /// Count features per geometry kind: (points, lines, unsupported)
    pub fn kind_counts(&self) -> (usize, usize, usize) {
        self.features.iter().fold((0, 0, 0), |(p, l, u), f| match f.kind() {
            GeometryKind::Point => (p + 1, l, u),
            GeometryKind::LineString => (p, l + 1, u),
            GeometryKind::Unsupported => (p, l, u + 1),
        })
    }
}

/// Central registry for format readers
pub struct FormatRegistry {
    readers: Vec<Box<dyn FormatReader>>,
}

impl FormatRegistry {
    /// Create a new empty format registry
    pub fn new() -> Self {
        Self { readers: Vec::new() }
    }

    /// Registry with every built-in reader
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(geojson::GeoJsonReader));
        registry
    }

    /// Register a format reader
    pub fn register(&mut self, reader: Box<dyn FormatReader>) {
        self.readers.push(reader);
    }

    /// Detect format and return appropriate reader
    pub fn detect_format(&self, path: &Path) -> Result<&dyn FormatReader> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(|| TopoError::UnsupportedFormat {
                extension: "none".to_string(),
                supported: self.supported_formats(),
            })?;

        self.readers
            .iter()
            .find(|r| r.supported_extensions().contains(&extension.as_str()))
            .map(|r| r.as_ref())
            .ok_or_else(|| TopoError::UnsupportedFormat {
                extension,
                supported: self.supported_formats(),
            })
    }

    /// Get list of all supported format extensions
    pub fn supported_formats(&self) -> Vec<String> {
        self.readers
            .iter()
            .flat_map(|r| r.supported_extensions())
            .map(|s| s.to_string())
            .collect()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
