//! Init and Config commands.

use std::process::ExitCode;

use anyhow::{Context, bail};

use crate::config::{CONFIG_DIR, CONFIG_FILE, Settings};

/// Run init command - create configuration file.
pub fn run_init(force: bool) -> anyhow::Result<ExitCode> {
    let config_path = std::path::Path::new(CONFIG_DIR).join(CONFIG_FILE);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at: {}\nUse --force to overwrite",
            config_path.display()
        );
    }

    let path = Settings::init_config_file(force)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("failed to write configuration")?;

    println!("Created configuration file at: {}", path.display());
    println!("Edit this file to customize your settings.");
    Ok(ExitCode::SUCCESS)
}

/// Run config command - display current configuration.
pub fn run_config(config: &Settings) -> anyhow::Result<ExitCode> {
    let toml_str = toml::to_string_pretty(config).context("failed to render configuration")?;
    println!("{toml_str}");
    Ok(ExitCode::SUCCESS)
}
