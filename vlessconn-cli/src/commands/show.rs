//! Show profile details command.

use std::path::Path;

use crate::error::CliError;
use crate::util::{find_profile, load_store};

/// Show profile details command handler
pub fn cmd_show(config_path: Option<&Path>, name: &str) -> Result<(), CliError> {
    let store = load_store(config_path)?;
    let profile = find_profile(store.profiles(), name)?;

    println!("Profile Details:");
    println!("  ID:        {}", profile.id);
    println!("  Name:      {}", profile.name);
    println!("  Address:   {}", profile.address);
    println!("  Port:      {}", profile.port);
    println!("  Transport: {}", profile.transport);
    println!(
        "  Created:   {}",
        profile
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
    );

    if let Some(ref reality) = profile.reality {
        println!("  Reality:   enabled");
        if let Some(ref key) = reality.public_key {
            println!("    Public Key:  {key}");
        }
        if let Some(ref sni) = reality.server_name {
            println!("    Server Name: {sni}");
        }
        if let Some(ref sid) = reality.short_id {
            println!("    Short ID:    {sid}");
        }
        if let Some(ref fp) = reality.fingerprint {
            println!("    Fingerprint: {fp}");
        }
    } else {
        println!("  Reality:   disabled");
    }

    println!("  Link:      {}", profile.raw_uri);

    Ok(())
}
