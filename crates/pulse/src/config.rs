//! Configuration management for pulse.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Environment variables (PULSE_*, GEMINI_API_KEY / API_KEY)
//! 2. Config file (PULSE_CONFIG or <data dir>/config.toml)
//! 3. Default values

use anyhow::{Context, Result};
use directories::ProjectDirs;
use pulse_core::ai::{DEFAULT_MODEL, GEMINI_API_BASE, GeminiConfig};
use pulse_core::prompt::{DEFAULT_LANGUAGE, PromptStyle};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::PulseError;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Generative AI provider settings
    #[serde(default)]
    pub ai: AiConfig,

    /// Prompt rendering settings
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Periodic refresh settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// Paths
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Gemini API key (falls back to GEMINI_API_KEY, then API_KEY)
    pub api_key: Option<String>,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// REST base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Language the model is asked to answer in
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Seconds between refresh passes
    #[serde(default = "default_watch_interval")]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Base directory for pulse data
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

// Default value functions
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    GEMINI_API_BASE.to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_watch_interval() -> u64 {
    3600 // 1 hour
}

fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PULSE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(proj_dirs) = ProjectDirs::from("dev", "eventpulse", "pulse") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".eventpulse")
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_watch_interval(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config: Config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Config::default()
        };

        if let Ok(dir) = std::env::var("PULSE_DATA_DIR") {
            config.paths.data_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("PULSE_CONFIG") {
            PathBuf::from(path)
        } else {
            default_data_dir().join("config.toml")
        }
    }

    /// API key from config, then GEMINI_API_KEY, then API_KEY.
    pub fn api_key(&self) -> Option<String> {
        self.ai
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }

    /// Provider configuration for the Gemini client.
    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.api_key().unwrap_or_default(),
            model: self.ai.model.clone(),
            base_url: self.ai.base_url.clone(),
            timeout_secs: self.ai.timeout_secs,
        }
    }

    pub fn prompt_style(&self) -> PromptStyle {
        PromptStyle::local(self.prompt.language.clone())
    }

    /// Watch period, overridden by `override_secs` when given.
    pub fn watch_period(&self, override_secs: Option<u64>) -> std::result::Result<Duration, PulseError> {
        let secs = override_secs.unwrap_or(self.watch.interval_secs);
        if secs == 0 {
            return Err(PulseError::Config("watch interval must be at least 1 second".into()));
        }
        Ok(Duration::from_secs(secs))
    }

    /// Serialize for display, masking the API key.
    pub fn to_display_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        if let Some(key) = shown.ai.api_key.as_mut() {
            *key = mask(key);
        }
        Ok(toml::to_string_pretty(&shown).map_err(PulseError::from)?)
    }
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}…", visible)
}
