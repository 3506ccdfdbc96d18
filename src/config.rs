use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CoachError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolsConfig {
    /// Location named in the forecast header.
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_days")]
    pub default_days: u32,
    /// Upper bound on generated days; larger requests are clamped.
    #[serde(default = "default_max_days")]
    pub max_days: u32,
    /// Fixed seed for reproducible output. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            default_days: default_days(),
            max_days: default_max_days(),
            seed: None,
        }
    }
}

fn default_location() -> String {
    "Seattle".into()
}

fn default_days() -> u32 {
    7
}

fn default_max_days() -> u32 {
    31
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
        }
    }
}

fn default_provider() -> String {
    "openai".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentsConfig {
    #[serde(default = "default_history_responses")]
    pub history_responses: usize,
    #[serde(default = "default_markdown")]
    pub markdown: bool,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            history_responses: default_history_responses(),
            markdown: default_markdown(),
        }
    }
}

fn default_history_responses() -> usize {
    5
}

fn default_markdown() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "info".into()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let cfg = Self::parse_file(path)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// File values with `FITCOACH_*` overrides on top, validated once merged.
    pub fn from_env_or_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut cfg = Self::parse_file(path)?;
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    fn parse_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|err| CoachError::Config(format!("Failed to parse configuration: {err}")))
    }

    fn apply_env(&mut self) {
        if let Ok(location) = env::var("FITCOACH_LOCATION") {
            self.tools.location = location;
        }
        if let Some(days) = parsed_env("FITCOACH_DEFAULT_DAYS") {
            self.tools.default_days = days;
        }
        if let Some(days) = parsed_env("FITCOACH_MAX_DAYS") {
            self.tools.max_days = days;
        }
        if let Some(seed) = parsed_env("FITCOACH_SEED") {
            self.tools.seed = Some(seed);
        }
        if let Ok(model) = env::var("FITCOACH_MODEL") {
            self.model.model = model;
        }
        if let Ok(filter) = env::var("FITCOACH_LOG") {
            self.telemetry.log_filter = filter;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.tools.max_days == 0 {
            return Err(CoachError::Config("`tools.max_days` must be at least 1".into()));
        }
        if self.tools.default_days > self.tools.max_days {
            return Err(CoachError::Config(format!(
                "`tools.default_days` ({}) exceeds `tools.max_days` ({})",
                self.tools.default_days, self.tools.max_days
            )));
        }
        Ok(())
    }
}

/// Parse a numeric override. Malformed values are ignored with a warning.
fn parsed_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring malformed environment override");
            None
        }
    }
}
