//! Settings commands.

use std::path::Path;

use crate::cli::SettingsCommands;
use crate::error::CliError;
use crate::util::create_config_manager;

/// Settings command handler
pub fn cmd_settings(config_path: Option<&Path>, subcmd: SettingsCommands) -> Result<(), CliError> {
    let config_manager = create_config_manager(config_path)?;
    let mut settings = config_manager.load_settings()?;

    match subcmd {
        SettingsCommands::Show => {
            let text = toml::to_string_pretty(&settings)
                .map_err(|e| CliError::Config(format!("Failed to serialize settings: {e}")))?;
            print!("{text}");
        }
        SettingsCommands::Set { key, value } => {
            settings.set_value(&key, &value)?;
            config_manager.save_settings(&settings)?;
            println!("Set {key} = {value}");
        }
    }

    Ok(())
}
