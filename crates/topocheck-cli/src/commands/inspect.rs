use crate::cli::InspectArgs;
use crate::output::OutputWriter;
use crate::output_types::InspectOutput;
use anyhow::{bail, Result};
use topocheck_core::formats::FormatRegistry;
use topocheck_core::TopoError;

/// Execute the inspect command
pub async fn execute(args: InspectArgs, output: &OutputWriter) -> Result<()> {
    let registry = FormatRegistry::with_defaults();
    let reader = registry.detect_format(&args.input)?;

    if !args.input.exists() {
        return Err(TopoError::InputNotFound { path: args.input }.into());
    }

    let validation = reader.validate(&args.input).await?;
    if !validation.is_valid() {
        bail!(
            "{} is not a valid {} file: {}",
            args.input.display(),
            reader.format_name(),
            validation.errors.join("; ")
        );
    }

    let dataset = reader.read(&args.input).await?;
    let (points, lines, unsupported) = dataset.kind_counts();

    if output.is_json() {
        return output.result(InspectOutput {
            input: args.input.display().to_string(),
            format: dataset.format_name,
            declared_crs: dataset.crs.as_ref().map(|c| c.epsg),
            features: dataset.features.len(),
            points,
            lines,
            unsupported,
            warnings: validation.warnings,
        });
    }

    output.section(format!("Dataset: {}", dataset.name));
    output.kv("Format", &dataset.format_name);
    match dataset.crs {
        Some(ref crs) => output.kv("CRS", crs),
        None => output.kv("CRS", "(not declared)"),
    }
    output.kv("Features", dataset.features.len());
    output.kv("Points", points);
    output.kv("Lines", lines);
    output.kv("Unsupported", unsupported);

    if validation.has_warnings() {
        for warning in &validation.warnings {
            output.warning(warning);
        }
    }

    Ok(())
}
