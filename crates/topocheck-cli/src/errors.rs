use console::style;
use std::fmt;
use topocheck_core::TopoError;

/// Error with remediation hints
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Convert anyhow::Error to CliError, adding hints for known failures
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    let chain = format!("{:#}", error);

    match error.chain().find_map(|e| e.downcast_ref::<TopoError>()) {
        Some(TopoError::InputNotFound { path }) => CliError::new("Input file not found")
            .with_context(format!("Path: {}", path.display()))
            .with_suggestion("Check the file path and try again")
            .with_help("Run: topocheck check --help"),
        Some(TopoError::InvalidCrs { value }) => CliError::new("Unrecognised CRS in input")
            .with_context(format!("Declared CRS: {}", value))
            .with_suggestion("Declare the CRS as \"EPSG:<code>\" in the file's crs member")
            .with_suggestion("Or remove the crs member and pass --source-crs <code>"),
        Some(TopoError::Projection { .. }) => CliError::new("Reprojection failed")
            .with_context(chain)
            .with_suggestion("Check that PROJ is installed and its data directory is reachable")
            .with_suggestion("Or pass --crs with the input's own CRS to skip reprojection"),
        Some(TopoError::UnsupportedGeometry { .. }) => CliError::new("Unsupported input")
            .with_context(chain)
            .with_suggestion("Only Point and LineString features are validated")
            .with_suggestion("Split polygons and multi-geometries into a separate file"),
        Some(TopoError::ConfigInvalid { key, reason }) => {
            CliError::new(format!("Invalid configuration: {}", key))
                .with_context(format!("Reason: {}", reason))
                .with_suggestion("Check topocheck.toml and TOPOCHECK_* environment variables")
                .with_help("Run: topocheck config")
        }
        _ => CliError::new(chain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_known_errors_get_suggestions() {
        let error =
            anyhow::Error::from(TopoError::InputNotFound { path: PathBuf::from("x.geojson") });
        let cli_error = from_anyhow(error);
        assert_eq!(cli_error.message, "Input file not found");
        assert!(!cli_error.suggestions.is_empty());
    }

    #[test]
    fn test_context_is_kept_for_unknown_errors() {
        let error = anyhow::anyhow!("disk full").context("Failed to write output");
        let cli_error = from_anyhow(error);
        assert_eq!(cli_error.message, "Failed to write output: disk full");
        assert!(cli_error.suggestions.is_empty());
    }
}
