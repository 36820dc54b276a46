//! Delete profile command.

use std::path::Path;

use crate::error::CliError;
use crate::util::{find_profile, load_store};

/// Delete profile command handler
pub fn cmd_delete(config_path: Option<&Path>, name: &str) -> Result<(), CliError> {
    let mut store = load_store(config_path)?;

    let profile = find_profile(store.profiles(), name)?;
    let id = profile.id;
    let profile_name = profile.name.clone();

    store.delete(id)?;

    println!("Deleted profile '{profile_name}' (ID: {id})");

    Ok(())
}
