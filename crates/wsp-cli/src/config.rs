//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::cli::{ConfigKey, OutputFormat};

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Default memory dump
    #[serde(default)]
    pub infile: Option<PathBuf>,

    /// Station altitude in meters
    #[serde(default)]
    pub altitude: Option<f32>,

    /// Estimate rain windows from the read period
    #[serde(default)]
    pub quick_rain: bool,

    /// Default history output format
    #[serde(default)]
    pub format: Option<String>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wsp")
            .join("config.toml")
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load config from `path`, or return default if missing or invalid
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
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
        self.save_to(&Self::path())
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Current value of `key`, if set
    pub fn get(&self, key: ConfigKey) -> Option<String> {
        match key {
            ConfigKey::Infile => self.infile.as_ref().map(|p| p.display().to_string()),
            ConfigKey::Altitude => self.altitude.map(|a| a.to_string()),
            ConfigKey::QuickRain => Some(self.quick_rain.to_string()),
            ConfigKey::Format => self.format.clone(),
            ConfigKey::NoColor => Some(self.no_color.to_string()),
        }
    }

    /// Set `key` from its string form
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<()> {
        match key {
            ConfigKey::Infile => self.infile = Some(PathBuf::from(value)),
            ConfigKey::Altitude => {
                let altitude: f32 = value
                    .parse()
                    .with_context(|| format!("'{}' is not a valid altitude", value))?;
                self.altitude = Some(altitude);
            }
            ConfigKey::QuickRain => self.quick_rain = parse_bool(value)?,
            ConfigKey::Format => {
                if OutputFormat::from_name(value).is_none() {
                    bail!(
                        "Invalid format '{}'. Valid values: text, json, csv, easyweather",
                        value
                    );
                }
                self.format = Some(value.to_lowercase());
            }
            ConfigKey::NoColor => self.no_color = parse_bool(value)?,
        }
        Ok(())
    }

    /// Reset `key` to its default
    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::Infile => self.infile = None,
            ConfigKey::Altitude => self.altitude = None,
            ConfigKey::QuickRain => self.quick_rain = false,
            ConfigKey::Format => self.format = None,
            ConfigKey::NoColor => self.no_color = false,
        }
    }

    /// Configured history format, ignoring unknown names
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.format.as_deref().and_then(OutputFormat::from_name)
    }
}

/// Parse boolean value with flexible input
fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => bail!(
            "Invalid boolean value '{}'. Use: true/false, yes/no, on/off, 1/0",
            s
        ),
    }
}

/// Resolve the dump to read: flag or `WSP_INFILE`, then config.
pub fn resolve_infile(arg: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    arg.or_else(|| config.infile.clone()).ok_or_else(|| {
        anyhow::anyhow!(
            "No memory dump specified. Use --infile <PATH>, set WSP_INFILE, \
             or run 'wsp config set infile <PATH>'."
        )
    })
}

/// Resolve altitude: flag, then config, then sea level.
pub fn resolve_altitude(arg: Option<f32>, config: &Config) -> f32 {
    arg.or(config.altitude).unwrap_or(0.0)
}
