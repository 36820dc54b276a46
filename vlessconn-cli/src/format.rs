//! Output formatting for profile listings.

use std::fmt::Write as _;

use serde::Serialize;
use vlessconn_core::Profile;

/// Escape a field for CSV output
///
/// Fields containing a comma, quote or line break are quoted, with inner
/// quotes doubled.
#[must_use]
pub fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Format profiles as a table string
#[must_use]
pub fn format_table(profiles: &[Profile]) -> String {
    if profiles.is_empty() {
        return "No profiles found.".to_string();
    }

    let mut output = String::new();

    let name_width = profiles
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);
    let endpoint_width = profiles
        .iter()
        .map(|p| p.display_endpoint().len())
        .max()
        .unwrap_or(8)
        .max(8);

    let _ = writeln!(
        output,
        "{:<name_width$}  {:<endpoint_width$}  REALITY",
        "NAME", "ENDPOINT"
    );
    let _ = writeln!(
        output,
        "{:-<name_width$}  {:-<endpoint_width$}  -------",
        "", ""
    );

    for profile in profiles {
        let _ = writeln!(
            output,
            "{:<name_width$}  {:<endpoint_width$}  {}",
            profile.name,
            profile.display_endpoint(),
            if profile.is_reality_enabled() { "yes" } else { "no" }
        );
    }

    output.trim_end().to_string()
}

/// Format profiles as a JSON array string
///
/// # Errors
///
/// Returns the `serde_json` error if serialization fails.
pub fn format_json(profiles: &[Profile]) -> serde_json::Result<String> {
    let output: Vec<ProfileOutput<'_>> = profiles.iter().map(ProfileOutput::from).collect();
    serde_json::to_string_pretty(&output)
}

/// Format profiles as CSV
#[must_use]
pub fn format_csv(profiles: &[Profile]) -> String {
    let mut output = String::from("id,name,address,port,reality,uri\n");

    for profile in profiles {
        let _ = writeln!(
            output,
            "{},{},{},{},{},{}",
            profile.id,
            escape_csv_field(&profile.name),
            escape_csv_field(&profile.address),
            profile.port,
            profile.is_reality_enabled(),
            escape_csv_field(&profile.raw_uri)
        );
    }

    output.trim_end().to_string()
}

/// Simplified profile output for CLI
///
/// The identifier is left out; it is a credential.
#[derive(Debug, Serialize)]
pub struct ProfileOutput<'a> {
    pub id: String,
    pub name: &'a str,
    pub address: &'a str,
    pub port: u16,
    pub reality: bool,
    pub uri: &'a str,
}

impl<'a> From<&'a Profile> for ProfileOutput<'a> {
    fn from(profile: &'a Profile) -> Self {
        Self {
            id: profile.id.to_string(),
            name: &profile.name,
            address: &profile.address,
            port: profile.port,
            reality: profile.is_reality_enabled(),
            uri: &profile.raw_uri,
        }
    }
}
