//! CLI configuration loading from file and environment variables.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use vox_types::VoiceSelector;
use vox_voice::{GoogleConfig, RecognitionSettings, DEFAULT_AUDIO_DIR};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Voice service credentials and endpoints.
    #[serde(default)]
    pub google: GoogleConfig,

    /// Voice used by `speak` unless overridden on the command line.
    #[serde(default)]
    pub voice: VoiceSelector,

    /// Language and silence detection for `listen`.
    #[serde(default)]
    pub recognition: RecognitionSettings,

    /// Audio staging settings.
    #[serde(default)]
    pub audio: AudioConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where playback and recording files are staged.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Staging directory. Created on demand and removed afterwards unless it
    /// already existed.
    #[serde(default = "default_audio_dir")]
    pub dir: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "vox_voice=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from(DEFAULT_AUDIO_DIR)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            dir: default_audio_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `VOX_GOOGLE_API_KEY` overrides `google.api_key`
/// - `VOX_AUDIO_DIR` overrides `audio.dir`
/// - `VOX_LOG_LEVEL` overrides `logging.level`
/// - `VOX_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    Ok(apply_overrides(config, |key| std::env::var(key).ok()))
}

fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(key) = var("VOX_GOOGLE_API_KEY") {
        config.google.api_key = key;
    }
    if let Some(dir) = var("VOX_AUDIO_DIR").filter(|dir| !dir.trim().is_empty()) {
        config.audio.dir = PathBuf::from(dir);
    }
    if let Some(level) = var("VOX_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("VOX_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    config
}
