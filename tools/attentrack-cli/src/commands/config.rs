//! Show or initialise the Attentrack configuration.

use std::path::PathBuf;

use attentrack_common::config::AppConfig;

pub fn run(
    config: &AppConfig,
    location: PathBuf,
    init: bool,
    force: bool,
    path_only: bool,
) -> anyhow::Result<()> {
    if path_only {
        println!("{}", location.display());
        return Ok(());
    }

    if init {
        if location.exists() && !force {
            anyhow::bail!(
                "Config already exists at {} (use --force to overwrite)",
                location.display()
            );
        }
        AppConfig::default()
            .save_to(&location)
            .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;
        println!("Wrote default config to {}", location.display());
        return Ok(());
    }

    println!("# {}", location.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
