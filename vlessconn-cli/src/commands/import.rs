//! Import links command.

use std::io::Read as _;
use std::path::Path;

use vlessconn_core::import_links;

use crate::error::CliError;
use crate::util::load_store;

/// Import links command handler
///
/// A `-` path reads from stdin.
pub fn cmd_import(config_path: Option<&Path>, file: &Path) -> Result<(), CliError> {
    let text = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)
            .map_err(|e| CliError::Import(format!("Failed to read {}: {e}", file.display())))?
    };

    let mut store = load_store(config_path)?;
    let summary = import_links(&mut store, &text)?;

    for skip in &summary.skipped {
        eprintln!("Skipped '{}': {}", skip.link, skip.reason);
    }
    println!("{}", summary.summary());

    Ok(())
}
