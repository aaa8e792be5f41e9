//! Inspect command implementation.

use anyhow::{Context, Result};
use std::path::Path;

/// Run an export session and print the assembled site as JSON
pub fn inspect_site(config_path: &Path, pretty: bool) -> Result<()> {
    let (_, _, site) = super::run_session(config_path, |options| options)?;

    let json = if pretty {
        serde_json::to_string_pretty(&site)
    } else {
        serde_json::to_string(&site)
    }
    .context("Failed to serialize export result")?;

    println!("{}", json);
    Ok(())
}
