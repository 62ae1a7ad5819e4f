//! Scrollpose configuration file handling

use anyhow::{Context, Result};
use clap::ValueEnum;
use scrollpose_animation::{AnimationSettings, ResetWindow, SettingsDocument};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in a directory
pub const CONFIG_FILE: &str = "scrollpose.toml";

/// Top-level configuration (scrollpose.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ScrollposeConfig {
    #[serde(default)]
    pub animation: AnimationConfig,
    /// Single-loop reset window
    #[serde(default)]
    pub scroll: ResetWindow,
    #[serde(default)]
    pub sample: SampleConfig,
}

/// Where the animation settings come from
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AnimationConfig {
    /// Exported settings document (relative to the config file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<PathBuf>,
    /// Override the document's loop count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loops: Option<u32>,
}

/// Sampling defaults for `scrollpose sample`
#[derive(Debug, Deserialize, Serialize)]
pub struct SampleConfig {
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_steps() -> u32 {
    20
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            format: OutputFormat::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl ScrollposeConfig {
    /// Load configuration from a file or a directory containing scrollpose.toml
    pub fn load(path: &Path) -> Result<Self> {
        let config_path = config_path(path);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    /// Load from the working directory, or defaults when there is no config file
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        if config_path(dir).exists() {
            Self::load(dir)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and check a config; an invalid `[scroll]` window is an error
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.scroll.validate().context("Invalid [scroll] section")?;
        Ok(config)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Read the configured settings document, applying the loop override.
    ///
    /// Returns `None` when no document is configured and no override is set.
    pub fn load_settings(&self, base_dir: &Path) -> Result<Option<AnimationSettings>> {
        let settings = match &self.animation.settings {
            Some(path) => Some(read_settings(&base_dir.join(path))?),
            None => None,
        };

        Ok(match (settings, self.animation.loops) {
            (Some(settings), Some(loops)) => Some(settings.with_loops(loops)),
            (None, Some(loops)) => Some(AnimationSettings::default().with_loops(loops)),
            (settings, None) => settings,
        })
    }
}

fn config_path(path: &Path) -> PathBuf {
    if path.is_file() {
        path.to_path_buf()
    } else {
        path.join(CONFIG_FILE)
    }
}

/// Read an exported settings document, or a bare settings object
pub fn read_settings(path: &Path) -> Result<AnimationSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_settings(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_settings(content: &str) -> Result<AnimationSettings> {
    match SettingsDocument::from_json(content) {
        Ok(doc) => Ok(doc.animation),
        Err(doc_err) => serde_json::from_str::<AnimationSettings>(content)
            .map_err(|_| anyhow::Error::new(doc_err)),
    }
}
