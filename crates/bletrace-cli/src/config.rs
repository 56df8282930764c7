//! Configuration file management.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default scan duration in seconds
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Default export destination
    #[serde(default)]
    pub export: Option<PathBuf>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,
}

impl Config {
    /// Path to the config file (`~/.config/bletrace/config.toml` or the
    /// platform equivalent).
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bletrace")
            .join("config.toml")
    }

    /// Load config, falling back to defaults when the file is missing or
    /// unreadable. Parse problems warn rather than abort.
    pub fn load() -> Self {
        let path = Self::path();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    eprintln!("Warning: Failed to read config: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timeout, None);
        assert_eq!(config.export, None);
        assert!(!config.no_color);
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = Config {
            timeout: Some(15),
            export: Some(PathBuf::from("/tmp/scan.json")),
            no_color: true,
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.timeout, Some(15));
        assert_eq!(back.export, Some(PathBuf::from("/tmp/scan.json")));
        assert!(back.no_color);
    }

    #[test]
    fn test_partial_config_parses() {
        let back: Config = toml::from_str("timeout = 20\n").unwrap();
        assert_eq!(back.timeout, Some(20));
        assert_eq!(back.export, None);
    }
}
