use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::ConfigEntry;
use anyhow::Result;
use std::path::Path;

/// Execute the config command
pub fn execute(config_path: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let config = load_config(config_path)?;

    let entries: Vec<ConfigEntry> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigEntry {
            key,
            value,
            source: source.to_string(),
        })
        .collect();

    if output.is_json() {
        return output.result(entries);
    }

    output.section("Effective Configuration");
    output.table(entries);
    Ok(())
}
