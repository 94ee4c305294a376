use crate::cli::CheckArgs;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::{CheckOutput, RuleRow};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use topocheck_core::config::{CliConfigOverrides, PairStrategy};
use topocheck_core::formats::geojson::GeoJsonWriter;
use topocheck_core::formats::FormatRegistry;
use topocheck_geo::{normalize_dataset, TopologyValidator, ValidationSettings};

/// Default output path: `<stem>_errors.geojson` next to the input
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_errors.geojson", stem))
}

fn overrides(args: &CheckArgs) -> CliConfigOverrides {
    CliConfigOverrides {
        target_crs: args.crs,
        source_crs: args.source_crs,
        point_threshold: args.point_threshold,
        line_threshold: args.line_threshold,
        endpoint_threshold: args.endpoint_threshold,
        pair_strategy: args.exhaustive.then_some(PairStrategy::Exhaustive),
        parallel: args.parallel.then_some(true),
    }
}

/// Execute the check command
pub async fn execute(
    args: CheckArgs,
    config_path: Option<&Path>,
    output: &OutputWriter,
) -> Result<()> {
    let config = load_config_with_overrides(config_path, overrides(&args))?;

    let registry = FormatRegistry::with_defaults();
    let reader = registry.detect_format(&args.input)?;

    tracing::info!("Reading {} as {}", args.input.display(), reader.format_name());
    let dataset = reader.read(&args.input).await?;
    let store = normalize_dataset(dataset, &config)?;

    let validator = TopologyValidator::from_settings(ValidationSettings::from_config(&config));
    let report = validator.run(&store);
    let flagged = report.project(&store);

    let output_path = args.output.clone().unwrap_or_else(|| default_output_path(&args.input));
    GeoJsonWriter::write(&output_path, &flagged, store.crs())
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if let Some(ref report_path) = args.report {
        if let Some(parent) = report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&report.records)?;
        std::fs::write(report_path, json)
            .with_context(|| format!("Failed to write report {}", report_path.display()))?;
    }

    if output.is_json() {
        return output.result(CheckOutput {
            input: args.input.display().to_string(),
            output: output_path.display().to_string(),
            report: args.report.as_ref().map(|p| p.display().to_string()),
            crs: store.crs().epsg,
            points: store.point_count(),
            lines: store.line_count(),
            ignored: store.unsupported_count(),
            flagged: flagged.len(),
            rules: report.summary,
        });
    }

    output.section("Topology Check");
    output.kv("Input", args.input.display());
    output.kv("CRS", store.crs());
    output.kv("Points", store.point_count());
    output.kv("Lines", store.line_count());
    if store.unsupported_count() > 0 {
        output.warning(format!(
            "{} feature(s) with unsupported geometry were not validated",
            store.unsupported_count()
        ));
    }

    output.section("Rules");
    output.table(report.summary.iter().map(RuleRow::from).collect());

    println!();
    if report.is_clean() {
        output.success("No topology errors found");
    } else {
        output.info(format!("{} of {} feature(s) flagged", flagged.len(), store.len()));
    }
    output.success(format!("Wrote {}", output_path.display()));
    if let Some(ref report_path) = args.report {
        output.success(format!("Wrote report {}", report_path.display()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("data/roads.geojson")),
            PathBuf::from("data/roads_errors.geojson")
        );
        assert_eq!(default_output_path(Path::new("pts.json")), PathBuf::from("pts_errors.geojson"));
    }
}
