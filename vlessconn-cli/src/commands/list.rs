//! List profiles command.

use std::path::Path;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::format::{format_csv, format_json, format_table};
use crate::util::load_store;

/// List profiles command handler
pub fn cmd_list(config_path: Option<&Path>, format: OutputFormat) -> Result<(), CliError> {
    let store = load_store(config_path)?;
    let profiles = store.profiles();

    let output = match format {
        OutputFormat::Table => format_table(profiles),
        OutputFormat::Json => format_json(profiles)
            .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))?,
        OutputFormat::Csv => format_csv(profiles),
    };
    println!("{output}");

    Ok(())
}
