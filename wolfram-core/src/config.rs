use anyhow::{Context, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fs, path::PathBuf};

use crate::error::{Result, SolverError};

/// Bundled demo key, used when no appid has been configured.
pub const DEFAULT_APPID: &str = "Y7R353-9HQAAL8KKA";

/// Unit system requested from Wolfram Alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    #[serde(alias = "Metric", alias = "METRIC")]
    Metric,
    #[serde(alias = "Imperial", alias = "IMPERIAL")]
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial]
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = SolverError;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(SolverError::InvalidConfig(format!(
                "Unknown units '{value}'. Supported units: metric, imperial."
            ))),
        }
    }
}

/// Solver configuration.
///
/// Example TOML:
/// ```toml
/// appid = "XXXXXX-XXXXXXXXXX"
/// units = "imperial"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub appid: String,
    pub units: Units,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            appid: DEFAULT_APPID.to_string(),
            units: Units::default(),
        }
    }
}

impl Config {
    pub fn new(appid: impl Into<String>, units: Units) -> Result<Self> {
        let cfg = Self {
            appid: appid.into(),
            units,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.appid.trim().is_empty() {
            return Err(SolverError::InvalidConfig(
                "appid must not be empty.\n\
                 Hint: run `wolfram configure` and enter your Wolfram Alpha appid."
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Parse and validate a config from its TOML form.
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let cfg: Config = toml::from_str(contents).context("Failed to parse config TOML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> anyhow::Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "wolfram-solver", "wolfram-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn uses_demo_appid(&self) -> bool {
        self.appid == DEFAULT_APPID
    }
}
