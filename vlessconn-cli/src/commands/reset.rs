//! Reset command.

use std::path::Path;

use crate::error::CliError;
use crate::util::load_store;

/// Reset command handler; deletes every profile
pub fn cmd_reset(config_path: Option<&Path>, confirmed: bool) -> Result<(), CliError> {
    if !confirmed {
        return Err(CliError::Config(
            "Refusing to delete all profiles without --yes".to_string(),
        ));
    }

    let mut store = load_store(config_path)?;
    let count = store.len();
    store.clear_all()?;

    println!("Deleted {count} profiles");

    Ok(())
}
