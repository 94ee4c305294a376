//! topocheck core - Domain models, geometry store, and configuration
//!
//! This crate contains the feature model, the in-memory geometry store, the
//! layered configuration and the file format collaborators used to load and
//! write feature collections.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod store;

pub use error::{Result, TopoError};
pub use store::GeometryStore;
