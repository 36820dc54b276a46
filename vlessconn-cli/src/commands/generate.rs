//! Generate link command.

use vlessconn_core::uri;

use crate::error::CliError;

/// Generate link command handler
pub fn cmd_generate(
    host: &str,
    port: u16,
    identifier: &str,
    params: &[(String, String)],
) -> Result<(), CliError> {
    if host.trim().is_empty() || identifier.trim().is_empty() {
        return Err(CliError::Config(
            "--host and --id must not be empty".to_string(),
        ));
    }
    println!("{}", uri::generate(identifier, host, port, params));
    Ok(())
}
