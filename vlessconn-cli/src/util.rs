//! Shared utility functions used across command modules.

use std::path::Path;

use vlessconn_core::{ConfigManager, FileStore, Profile, ProfileStore};

use crate::error::CliError;

/// Creates a `ConfigManager` using the optional custom config directory
/// from CLI args.
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_config_dir(path.to_path_buf())),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Opens the on-disk profile store and loads it
pub fn load_store(config_path: Option<&Path>) -> Result<ProfileStore<FileStore>, CliError> {
    let config_manager = create_config_manager(config_path)?;
    let mut store = ProfileStore::new(config_manager.profile_storage());
    store.load()?;
    Ok(store)
}

/// Parse a key=value pair for link query parameters
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{s}`"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Find a profile by name or UUID
///
/// Tries an exact name, the UUID, a case-insensitive name and finally a
/// unique case-insensitive name prefix.
pub fn find_profile<'a>(profiles: &'a [Profile], name_or_id: &str) -> Result<&'a Profile, CliError> {
    if let Some(profile) = profiles.iter().find(|p| p.name == name_or_id) {
        return Ok(profile);
    }

    if let Ok(uuid) = uuid::Uuid::parse_str(name_or_id)
        && let Some(profile) = profiles.iter().find(|p| p.id == uuid)
    {
        return Ok(profile);
    }

    if let Some(profile) = profiles
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name_or_id))
    {
        return Ok(profile);
    }

    let query = name_or_id.to_lowercase();
    let matches: Vec<_> = profiles
        .iter()
        .filter(|p| p.name.to_lowercase().starts_with(&query))
        .collect();

    match matches.as_slice() {
        [] => Err(CliError::ProfileNotFound(name_or_id.to_string())),
        [profile] => Ok(profile),
        _ => Err(CliError::Ambiguous {
            query: name_or_id.to_string(),
            matches: matches
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
