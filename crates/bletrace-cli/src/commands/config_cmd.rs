//! Config command implementation.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Subcommand;

use crate::config::Config;

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the config file location
    Path,
    /// Show the current configuration
    Show,
    /// Set a configuration key (timeout, export, no_color)
    Set {
        /// Key to set
        key: String,
        /// New value
        value: String,
    },
    /// Reset a configuration key to its default
    Unset {
        /// Key to reset
        key: String,
    },
}

pub fn cmd_config(action: ConfigAction, mut config: Config) -> Result<()> {
    match action {
        ConfigAction::Path => {
            println!("{}", Config::path().display());
        }
        ConfigAction::Show => {
            let timeout = config
                .timeout
                .map(|t| t.to_string())
                .unwrap_or_else(|| "(default)".to_string());
            let export = config
                .export
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(default)".to_string());
            println!("timeout  = {}", timeout);
            println!("export   = {}", export);
            println!("no_color = {}", config.no_color);
        }
        ConfigAction::Set { key, value } => {
            match key.as_str() {
                "timeout" => {
                    let secs: u64 = value
                        .parse()
                        .map_err(|_| anyhow::anyhow!("timeout must be a number of seconds"))?;
                    if secs == 0 {
                        bail!("timeout must be positive");
                    }
                    config.timeout = Some(secs);
                }
                "export" => config.export = Some(PathBuf::from(value)),
                "no_color" => {
                    config.no_color = value
                        .parse()
                        .map_err(|_| anyhow::anyhow!("no_color must be true or false"))?;
                }
                other => bail!("Unknown config key: {}", other),
            }
            config.save()?;
            println!("Saved {}.", key);
        }
        ConfigAction::Unset { key } => {
            match key.as_str() {
                "timeout" => config.timeout = None,
                "export" => config.export = None,
                "no_color" => config.no_color = false,
                other => bail!("Unknown config key: {}", other),
            }
            config.save()?;
            println!("Reset {}.", key);
        }
    }
    Ok(())
}
