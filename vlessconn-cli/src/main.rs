//! `vlessconn` CLI - Command-line interface for the vlessconn profile manager
//!
//! Provides commands for listing, adding, importing, exporting and editing
//! VLESS profiles, plus link parsing/generation and settings management.

mod cli;
mod commands;
mod error;
mod format;
mod util;

use clap::Parser;
use cli::Cli;
use vlessconn_core::{TracingConfig, TracingLevel, TracingOutput, init_tracing};

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    if cli.verbose > 0 && !cli.quiet {
        let config = TracingConfig::new()
            .with_level(TracingLevel::from_verbosity(cli.verbose))
            .with_output(TracingOutput::Stderr);
        if let Err(e) = init_tracing(&config) {
            eprintln!("Warning: failed to initialize logging: {e}");
        }
    }

    let result = commands::dispatch(config_path, cli.command);

    if let Err(e) = result {
        tracing::debug!(error = %e, "Command failed");
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
