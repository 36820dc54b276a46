//! Parse link command.

use vlessconn_core::uri;

use crate::error::CliError;

/// Parse link command handler
pub fn cmd_parse(link: &str) -> Result<(), CliError> {
    let parsed = uri::parse(link)?;
    let json = serde_json::to_string_pretty(&parsed)
        .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))?;
    println!("{json}");
    Ok(())
}
