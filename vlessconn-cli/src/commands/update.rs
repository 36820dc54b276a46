//! Update profile command.

use std::path::Path;

use crate::error::CliError;
use crate::util::{find_profile, load_store};

/// Fields to change; `None` keeps the current value
pub struct UpdateParams {
    pub name: Option<String>,
    pub host: Option<String>,
    pub port: Option<u32>,
    pub identifier: Option<String>,
}

/// Update profile command handler
pub fn cmd_update(
    config_path: Option<&Path>,
    name: &str,
    params: UpdateParams,
) -> Result<(), CliError> {
    let mut store = load_store(config_path)?;
    let current = find_profile(store.profiles(), name)?;
    let id = current.id;

    let replacement = current.with_details(
        params.name.unwrap_or_else(|| current.name.clone()),
        params.host.unwrap_or_else(|| current.address.clone()),
        params.port.unwrap_or_else(|| u32::from(current.port)),
        params
            .identifier
            .unwrap_or_else(|| current.identifier.clone()),
    )?;
    let new_name = replacement.name.clone();

    if !store.update(id, replacement)? {
        return Err(CliError::ProfileNotFound(name.to_string()));
    }

    println!("Updated profile '{new_name}' (ID: {id})");

    Ok(())
}
