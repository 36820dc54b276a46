//! Command handler modules for the CLI.

mod add;
mod completions;
mod delete;
mod export;
mod generate;
mod import;
mod list;
mod parse;
mod reset;
mod settings;
mod show;
mod update;

use std::path::Path;

use crate::cli::Commands;
use crate::error::CliError;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(config_path: Option<&Path>, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::List { format } => list::cmd_list(config_path, format),
        Commands::Add {
            name,
            uri,
            host,
            port,
            id,
        } => add::cmd_add(
            config_path,
            &name,
            add::AddSource::from_args(uri, host, port, id)?,
        ),
        Commands::Import { file } => import::cmd_import(config_path, &file),
        Commands::Show { name } => show::cmd_show(config_path, &name),
        Commands::Delete { name } => delete::cmd_delete(config_path, &name),
        Commands::Update {
            name,
            new_name,
            host,
            port,
            id,
        } => update::cmd_update(
            config_path,
            &name,
            update::UpdateParams {
                name: new_name,
                host,
                port,
                identifier: id,
            },
        ),
        Commands::Export { output } => export::cmd_export(config_path, output.as_deref()),
        Commands::Parse { uri } => parse::cmd_parse(&uri),
        Commands::Generate {
            host,
            port,
            id,
            params,
        } => generate::cmd_generate(&host, port, &id, &params),
        Commands::Settings(subcmd) => settings::cmd_settings(config_path, subcmd),
        Commands::Reset { yes } => reset::cmd_reset(config_path, yes),
        Commands::Completions { shell } => completions::cmd_completions(shell),
    }
}
