//! Error types for topocheck

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors. Validation findings are data and never show up here.
#[derive(Debug, Error)]
pub enum TopoError {
    // Input errors
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Unsupported format: .{extension}. Supported: {}", supported.join(", "))]
    UnsupportedFormat {
        extension: String,
        supported: Vec<String>,
    },

    #[error("Failed to parse {format}: {reason}")]
    Parse { format: String, reason: String },

    #[error("Unrecognised CRS declaration: {value}")]
    InvalidCrs { value: String },

    #[error("Projection from {from} to {to} failed: {reason}")]
    Projection {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Feature id {id} appears more than once")]
    DuplicateFeatureId { id: String },

    #[error(
        "{unsupported} of {total} features are neither Point nor LineString; refusing to validate"
    )]
    UnsupportedGeometry { unsupported: usize, total: usize },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, TopoError>;
