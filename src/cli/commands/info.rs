//! Normalizer preview, provider listing and config bootstrap commands.

use std::path::PathBuf;

use crate::config::{self, Config, ConfigError};
use crate::error::{Error, Result, ResultExt};
use crate::lyrics::enabled_kinds;

/// Print the normalized form of a title
pub fn cmd_normalize(config: &Config, text: &str) {
    println!("{}", config.search.noise_rules().normalize(text));
}

/// List enabled providers and where the config comes from
pub fn cmd_providers(config: &Config, config_path: Option<PathBuf>) {
    match config_path {
        Some(path) if path.exists() => println!("Config: {}", path.display()),
        Some(path) => println!("Config: {} (not found, using defaults)", path.display()),
        None => println!("Config: defaults (no config directory)"),
    }
    println!();

    let kinds = enabled_kinds(&config.providers);
    if kinds.is_empty() {
        println!("✗ No lyrics providers enabled.");
        return;
    }

    println!("Enabled providers (in order):");
    for kind in kinds {
        println!("  ✓ {:<12} key: {}", kind.label(), kind.key());
    }
    println!();
    println!("Request timeout: {}s", config.providers.request_timeout().as_secs());
    match config.search.task_timeout_secs {
        Some(secs) if secs > 0 => println!("Task timeout:    {}s", secs),
        _ => println!("Task timeout:    off"),
    }
    println!("Wait timeout:    {}s", config.search.wait_timeout_secs);
    println!("Noise rules:     {} pattern(s)", config.search.noise_rules().len());
}

/// Write the default configuration to `path`
pub fn cmd_init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.ok_or(ConfigError::NoConfigDir)?;
    if path.exists() && !force {
        return Err(Error::invalid_input(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    config::save_to(&path, &Config::default()).with_context("Writing default config")?;
    println!("✓ Wrote default config to {}", path.display());
    Ok(())
}
