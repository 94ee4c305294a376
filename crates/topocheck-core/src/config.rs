use crate::error::{Result, TopoError};
use crate::models::Crs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment => "env",
            ConfigSource::Cli => "cli",
        };
        f.write_str(s)
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// How candidate pairs are enumerated by the pairwise rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PairStrategy {
    /// Every unordered pair, O(n²)
    Exhaustive,
    /// R-tree envelope pruning, then the exact predicate
    #[default]
    Indexed,
}

/// Layered configuration for topocheck
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// Working CRS (EPSG). Thresholds are in its units, so it should be a
    /// metric projected CRS; well-known geographic codes are rejected.
    pub target_crs: ConfigValue<u32>,
    /// CRS assumed for input that declares none
    pub source_crs: ConfigValue<u32>,
    pub point_threshold: ConfigValue<f64>,
    pub line_threshold: ConfigValue<f64>,
    /// Falls back to `line_threshold` when unset
    pub endpoint_threshold: ConfigValue<Option<f64>>,
    pub pair_strategy: ConfigValue<PairStrategy>,
    pub parallel: ConfigValue<bool>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            target_crs: ConfigValue::new(25832, ConfigSource::Default),
            source_crs: ConfigValue::new(4326, ConfigSource::Default),
            point_threshold: ConfigValue::new(1.0, ConfigSource::Default),
            line_threshold: ConfigValue::new(1.0, ConfigSource::Default),
            endpoint_threshold: ConfigValue::new(None, ConfigSource::Default),
            pair_strategy: ConfigValue::new(PairStrategy::Indexed, ConfigSource::Default),
            parallel: ConfigValue::new(false, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| TopoError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| TopoError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(crs) = file_config.target_crs {
            self.target_crs.update(crs, ConfigSource::File);
        }
        if let Some(crs) = file_config.source_crs {
            self.source_crs.update(crs, ConfigSource::File);
        }
        if let Some(t) = file_config.point_threshold {
            self.point_threshold.update(t, ConfigSource::File);
        }
        if let Some(t) = file_config.line_threshold {
            self.line_threshold.update(t, ConfigSource::File);
        }
        if let Some(t) = file_config.endpoint_threshold {
            self.endpoint_threshold.update(Some(t), ConfigSource::File);
        }
        if let Some(strategy) = file_config.pair_strategy {
            self.pair_strategy.update(strategy, ConfigSource::File);
        }
        if let Some(parallel) = file_config.parallel {
            self.parallel.update(parallel, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Some(crs) = env_value("TOPOCHECK_TARGET_CRS", "integer EPSG code", parse_epsg) {
            self.target_crs.update(crs, ConfigSource::Environment);
        }
        if let Some(crs) = env_value("TOPOCHECK_SOURCE_CRS", "integer EPSG code", parse_epsg) {
            self.source_crs.update(crs, ConfigSource::Environment);
        }
        if let Some(t) = env_value("TOPOCHECK_POINT_THRESHOLD", "distance in meters", |s| {
            parse_threshold("point_threshold", s)
        }) {
            self.point_threshold.update(t, ConfigSource::Environment);
        }
        if let Some(t) = env_value("TOPOCHECK_LINE_THRESHOLD", "distance in meters", |s| {
            parse_threshold("line_threshold", s)
        }) {
            self.line_threshold.update(t, ConfigSource::Environment);
        }
        if let Some(t) = env_value("TOPOCHECK_ENDPOINT_THRESHOLD", "distance in meters", |s| {
            parse_threshold("endpoint_threshold", s)
        }) {
            self.endpoint_threshold.update(Some(t), ConfigSource::Environment);
        }
        if let Some(strategy) =
            env_value("TOPOCHECK_PAIR_STRATEGY", "exhaustive or indexed", parse_pair_strategy)
        {
            self.pair_strategy.update(strategy, ConfigSource::Environment);
        }
        if let Some(parallel) = env_value("TOPOCHECK_PARALLEL", "true or false", parse_bool) {
            self.parallel.update(parallel, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(crs) = overrides.target_crs {
            self.target_crs.update(crs, ConfigSource::Cli);
        }
        if let Some(crs) = overrides.source_crs {
            self.source_crs.update(crs, ConfigSource::Cli);
        }
        if let Some(t) = overrides.point_threshold {
            self.point_threshold.update(t, ConfigSource::Cli);
        }
        if let Some(t) = overrides.line_threshold {
            self.line_threshold.update(t, ConfigSource::Cli);
        }
        if let Some(t) = overrides.endpoint_threshold {
            self.endpoint_threshold.update(Some(t), ConfigSource::Cli);
        }
        if let Some(strategy) = overrides.pair_strategy {
            self.pair_strategy.update(strategy, ConfigSource::Cli);
        }
        if let Some(parallel) = overrides.parallel {
            self.parallel.update(parallel, ConfigSource::Cli);
        }
    }

    /// Threshold used by the endpoint rule
    pub fn effective_endpoint_threshold(&self) -> f64 {
        self.endpoint_threshold.value.unwrap_or(self.line_threshold.value)
    }

    /// Reject thresholds that are negative or not finite, and a geographic
    /// working CRS
    pub fn validate(&self) -> Result<()> {
        let target = Crs::from_epsg(self.target_crs.value);
        if target.is_geographic() {
            return Err(TopoError::ConfigInvalid {
                key: "target_crs".to_string(),
                reason: format!(
                    "{} is geographic (degrees); choose a projected CRS in meters",
                    target
                ),
            });
        }
        check_threshold("point_threshold", self.point_threshold.value)?;
        check_threshold("line_threshold", self.line_threshold.value)?;
        if let Some(t) = self.endpoint_threshold.value {
            check_threshold("endpoint_threshold", t)?;
        }
        Ok(())
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();

        map.insert(
            "target_crs".to_string(),
            (format!("EPSG:{}", self.target_crs.value), self.target_crs.source),
        );
        map.insert(
            "source_crs".to_string(),
            (format!("EPSG:{}", self.source_crs.value), self.source_crs.source),
        );
        map.insert(
            "point_threshold".to_string(),
            (self.point_threshold.value.to_string(), self.point_threshold.source),
        );
        map.insert(
            "line_threshold".to_string(),
            (self.line_threshold.value.to_string(), self.line_threshold.source),
        );
        map.insert(
            "endpoint_threshold".to_string(),
            (self.effective_endpoint_threshold().to_string(), self.endpoint_threshold.source),
        );
        map.insert(
            "pair_strategy".to_string(),
            (format!("{:?}", self.pair_strategy.value).to_lowercase(), self.pair_strategy.source),
        );
        map.insert(
            "parallel".to_string(),
            (self.parallel.value.to_string(), self.parallel.source),
        );

        map
    }
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    target_crs: Option<u32>,
    source_crs: Option<u32>,
    point_threshold: Option<f64>,
    line_threshold: Option<f64>,
    endpoint_threshold: Option<f64>,
    pair_strategy: Option<PairStrategy>,
    parallel: Option<bool>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub target_crs: Option<u32>,
    pub source_crs: Option<u32>,
    pub point_threshold: Option<f64>,
    pub line_threshold: Option<f64>,
    pub endpoint_threshold: Option<f64>,
    pub pair_strategy: Option<PairStrategy>,
    pub parallel: Option<bool>,
}

/// Read and parse an environment variable, warning on bad values
fn env_value<T>(name: &str, expected: &str, parse: impl Fn(&str) -> Result<T>) -> Option<T> {
    let raw = env::var(name).ok()?;
    match parse(&raw) {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': expected {}", name, raw, expected);
            None
        }
    }
}

fn parse_epsg(s: &str) -> Result<u32> {
    s.trim().parse::<u32>().map_err(|e| TopoError::ConfigInvalid {
        key: "crs".to_string(),
        reason: format!("Invalid EPSG code '{}': {}", s, e),
    })
}

fn check_threshold(key: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(TopoError::ConfigInvalid {
            key: key.to_string(),
            reason: format!("Threshold must be a finite, non-negative distance, got {}", value),
        });
    }
    Ok(())
}

/// Parse a threshold in meters
pub fn parse_threshold(key: &str, s: &str) -> Result<f64> {
    let value = s.trim().parse::<f64>().map_err(|e| TopoError::ConfigInvalid {
        key: key.to_string(),
        reason: format!("Invalid distance '{}': {}", s, e),
    })?;
    check_threshold(key, value)?;
    Ok(value)
}

/// Parse pair strategy from string
pub fn parse_pair_strategy(s: &str) -> Result<PairStrategy> {
    match s.to_lowercase().as_str() {
        "exhaustive" | "brute-force" => Ok(PairStrategy::Exhaustive),
        "indexed" | "rtree" => Ok(PairStrategy::Indexed),
        _ => Err(TopoError::ConfigInvalid {
            key: "pair_strategy".to_string(),
            reason: format!("Invalid pair strategy: {}. Use exhaustive or indexed", s),
        }),
    }
}

fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(TopoError::ConfigInvalid {
            key: "parallel".to_string(),
            reason: format!("Invalid boolean: {}", s),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.target_crs.value, 25832);
        assert_eq!(config.target_crs.source, ConfigSource::Default);
        assert_eq!(config.point_threshold.value, 1.0);
        assert_eq!(config.line_threshold.value, 1.0);
        assert_eq!(config.effective_endpoint_threshold(), 1.0);
        assert_eq!(config.pair_strategy.value, PairStrategy::Indexed);
        assert!(!config.parallel.value);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(1.0, ConfigSource::Default);

        value.update(2.0, ConfigSource::File);
        assert_eq!(value.value, 2.0);

        value.update(3.0, ConfigSource::Environment);
        assert_eq!(value.source, ConfigSource::Environment);

        value.update(4.0, ConfigSource::Cli);
        assert_eq!(value.value, 4.0);

        // Lower precedence should not override
        value.update(5.0, ConfigSource::File);
        assert_eq!(value.value, 4.0);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
target_crs = 25833
point_threshold = 0.5
line_threshold = 2.0
endpoint_threshold = 0.25
pair_strategy = "exhaustive"
parallel = true
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.target_crs.value, 25833);
        assert_eq!(config.target_crs.source, ConfigSource::File);
        assert_eq!(config.point_threshold.value, 0.5);
        assert_eq!(config.line_threshold.value, 2.0);
        assert_eq!(config.effective_endpoint_threshold(), 0.25);
        assert_eq!(config.pair_strategy.value, PairStrategy::Exhaustive);
        assert!(config.parallel.value);
        assert_eq!(config.source_crs.source, ConfigSource::Default);
    }

    #[test]
    fn test_bad_file_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "point_threshold = \"close\"").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(TopoError::ConfigInvalid { .. })));
    }

    #[test]
    #[serial]
    fn test_load_from_env() {
        env::set_var("TOPOCHECK_LINE_THRESHOLD", "3.5");
        env::set_var("TOPOCHECK_PAIR_STRATEGY", "bogus");

        let config = LayeredConfig::with_defaults().load_from_env();

        env::remove_var("TOPOCHECK_LINE_THRESHOLD");
        env::remove_var("TOPOCHECK_PAIR_STRATEGY");

        assert_eq!(config.line_threshold.value, 3.5);
        assert_eq!(config.line_threshold.source, ConfigSource::Environment);
        // Invalid values are ignored
        assert_eq!(config.pair_strategy.value, PairStrategy::Indexed);
        assert_eq!(config.pair_strategy.source, ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            target_crs: Some(32632),
            line_threshold: Some(0.75),
            ..Default::default()
        });

        assert_eq!(config.target_crs.value, 32632);
        assert_eq!(config.target_crs.source, ConfigSource::Cli);
        assert_eq!(config.effective_endpoint_threshold(), 0.75);
        assert_eq!(config.point_threshold.source, ConfigSource::Default);
    }

    #[test]
    fn test_validate_rejects_negative_threshold() {
        let mut config = LayeredConfig::with_defaults();
        config.point_threshold.update(-1.0, ConfigSource::Cli);
        assert!(config.validate().is_err());

        let mut config = LayeredConfig::with_defaults();
        config.endpoint_threshold.update(Some(f64::NAN), ConfigSource::Cli);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_geographic_target() {
        let mut config = LayeredConfig::with_defaults();
        config.target_crs.update(4326, ConfigSource::Cli);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, TopoError::ConfigInvalid { ref key, .. } if key == "target_crs"));

        config.target_crs.value = 3857;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_pair_strategy("RTREE").unwrap(), PairStrategy::Indexed);
        assert_eq!(parse_pair_strategy("exhaustive").unwrap(), PairStrategy::Exhaustive);
        assert!(parse_pair_strategy("quadtree").is_err());
        assert_eq!(parse_threshold("t", "0.3").unwrap(), 0.3);
        assert!(parse_threshold("t", "-2").is_err());
        assert!(parse_threshold("t", "inf").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let map = LayeredConfig::with_defaults().to_inspection_map();

        let (crs_value, crs_source) = &map["target_crs"];
        assert_eq!(crs_value, "EPSG:25832");
        assert_eq!(*crs_source, ConfigSource::Default);
        assert_eq!(map["pair_strategy"].0, "indexed");
        assert_eq!(map.len(), 7);
    }
}
