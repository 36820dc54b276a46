//! Add profile command.

use std::path::Path;

use vlessconn_core::Profile;

use crate::error::CliError;
use crate::util::load_store;

/// Where the new profile's fields come from
pub enum AddSource {
    /// A full link
    Uri(String),
    /// Individually entered fields
    Manual {
        host: String,
        port: u32,
        identifier: String,
    },
}

impl AddSource {
    /// Builds the source from the raw `add` arguments
    pub fn from_args(
        uri: Option<String>,
        host: Option<String>,
        port: u32,
        id: Option<String>,
    ) -> Result<Self, CliError> {
        match (uri, host, id) {
            (Some(uri), None, None) => Ok(Self::Uri(uri)),
            (None, Some(host), Some(identifier)) => Ok(Self::Manual {
                host,
                port,
                identifier,
            }),
            _ => Err(CliError::Config(
                "Provide either --uri, or --host together with --id".to_string(),
            )),
        }
    }
}

/// Add profile command handler
pub fn cmd_add(config_path: Option<&Path>, name: &str, source: AddSource) -> Result<(), CliError> {
    let profile = match source {
        AddSource::Uri(uri) => Profile::from_uri(name, &uri)?,
        AddSource::Manual {
            host,
            port,
            identifier,
        } => Profile::manual(name, host, port, identifier)?,
    };

    let mut store = load_store(config_path)?;
    let display = profile.display_endpoint();
    let id = store.add(profile)?;

    println!("Added profile '{name}' ({display}, ID: {id})");

    Ok(())
}
