//! Configuration loading for the qlearn CLI

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

use qlearn_env::{FrozenLakeOptions, FROZEN_LAKE};
use qlearn_rl::{AgentConfig, WatchOptions};

/// Configuration for the CLI
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub training: TrainingConfig,
    pub environment: EnvironmentConfig,
    pub watch: WatchConfig,
    pub logging: LoggingConfig,

    /// File the configuration was read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub episodes: usize,
    /// Episodes between progress log lines (0 disables)
    pub log_interval: usize,
    /// Greedy evaluation episodes run after training (0 skips)
    pub eval_episodes: usize,
    /// Write the per-episode table here (`.json` or CSV)
    pub output: Option<PathBuf>,
    /// Write the learned value table here
    pub save_table: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 5000,
            log_interval: 500,
            eval_episodes: 100,
            output: None,
            save_table: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub id: String,
    pub is_slippery: bool,
    pub map: Option<Vec<String>>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            id: FROZEN_LAKE.to_string(),
            is_slippery: true,
            map: None,
        }
    }
}

impl EnvironmentConfig {
    pub fn options(&self) -> FrozenLakeOptions {
        FrozenLakeOptions {
            is_slippery: self.is_slippery,
            map: self.map.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Play one rendered episode after `run` finishes training
    pub enabled: bool,
    pub step_delay_ms: u64,
    pub max_steps: Option<usize>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            step_delay_ms: 300,
            max_steps: None,
        }
    }
}

impl WatchConfig {
    pub fn options(&self) -> WatchOptions {
        WatchOptions {
            step_delay: Duration::from_millis(self.step_delay_ms),
            max_steps: self.max_steps,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// An explicit path must exist; otherwise the first file found by
    /// [`Config::find_config_file`] is used, if any.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = explicit
            .map(Path::to_path_buf)
            .or_else(Self::find_config_file);

        let mut builder = ConfigBuilder::<config::builder::DefaultState>::default();

        if let Some(path) = &config_path {
            builder = builder.add_source(File::from(path.clone()).required(explicit.is_some()));
        }

        // Add environment variables with QLEARN_ prefix
        builder = builder.add_source(
            Environment::with_prefix("QLEARN")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: Self = builder
            .build()?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.source = config_path.filter(|path| path.exists());
        Ok(config)
    }

    /// Find the configuration file
    fn find_config_file() -> Option<PathBuf> {
        // Check in order: QLEARN_CONFIG env, ./qlearn.toml, ~/.config/qlearn/qlearn.toml
        if let Ok(path) = std::env::var("QLEARN_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let local = PathBuf::from("qlearn.toml");
        if local.exists() {
            return Some(local);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("qlearn").join("qlearn.toml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }

    /// Reject settings that would make training meaningless
    pub fn validate(&self) -> Result<()> {
        self.agent
            .validate()
            .context("Invalid [agent] configuration")?;
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            anyhow::bail!(
                "Invalid [logging] format '{}': expected 'pretty' or 'json'",
                self.logging.format
            );
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
