use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// topocheck - topology QA for point and line datasets
#[derive(Parser, Debug)]
#[command(name = "topocheck")]
#[command(about = "Flag duplicated, overly close, intersecting and near-miss geometries", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./topocheck.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a dataset and write the flagged features
    Check(CheckArgs),

    /// Show what a dataset contains without validating it
    Inspect(InspectArgs),

    /// Show the effective configuration and where each value comes from
    Config,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Input GeoJSON file
    pub input: PathBuf,

    /// Output file for flagged features (defaults to <input>_errors.geojson)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Also write every diagnostic record to this JSON file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Working CRS EPSG code; thresholds use its units (geographic CRSs are rejected)
    #[arg(long)]
    pub crs: Option<u32>,

    /// CRS assumed when the input declares none
    #[arg(long)]
    pub source_crs: Option<u32>,

    /// Distance in meters under which two points are too close
    #[arg(long)]
    pub point_threshold: Option<f64>,

    /// Distance in meters under which two non-touching lines are too close
    #[arg(long)]
    pub line_threshold: Option<f64>,

    /// Distance in meters under which endpoints of different lines are too close
    /// (defaults to the line threshold)
    #[arg(long)]
    pub endpoint_threshold: Option<f64>,

    /// Compare every pair instead of using the spatial index
    #[arg(long)]
    pub exhaustive: bool,

    /// Run the rules in parallel
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Input GeoJSON file
    pub input: PathBuf,
}
