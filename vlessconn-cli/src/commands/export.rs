//! Export links command.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::CliError;
use crate::util::load_store;

/// Export links command handler
///
/// Writes each profile's link on its own line, to `output` or stdout.
pub fn cmd_export(config_path: Option<&Path>, output: Option<&Path>) -> Result<(), CliError> {
    let store = load_store(config_path)?;

    let mut text = String::new();
    for profile in store.profiles() {
        let _ = writeln!(text, "{}", profile.raw_uri);
    }

    match output {
        Some(path) => {
            std::fs::write(path, &text).map_err(|e| {
                CliError::Export(format!("Failed to write {}: {e}", path.display()))
            })?;
            eprintln!("Exported {} profiles to {}", store.len(), path.display());
        }
        None => print!("{text}"),
    }

    Ok(())
}
