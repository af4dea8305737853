//! Configuration management for voxkey.
//!
//! TOML configuration with cross-platform paths, lazy model validation, and
//! atomic writes.

use crate::{
    AppError, AppResult,
    config::{
        AudioConfig, BehaviourConfig, DEFAULT_HOLD_THRESHOLD_MS, DEFAULT_INJECTION_DELAY_MS,
        DEFAULT_LANGUAGE, DEFAULT_MIN_RECORDING_MS, WhisperConfig,
    },
};

use std::{fs, io::Write, panic::Location, path::PathBuf};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Whisper model configuration.
    pub whisper: WhisperConfig,
    /// Audio device configuration.
    pub audio: AudioConfig,
    /// Hold-to-talk timing settings.
    pub behaviour: BehaviourConfig,
}

impl Config {
    /// Load configuration from disk, creating defaults if not found.
    ///
    /// The model path is NOT validated here; call `validate_model_path()`
    /// before constructing the transcriber so a fresh install can at least
    /// start up far enough to log where the model is expected.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to read config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to parse config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            info!(config_path = ?config_path, "Configuration loaded");

            Ok(config)
        } else {
            info!("No config found, creating default");
            Self::create_default()
        }
    }

    /// Validate that the whisper model file exists at the configured path.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate_model_path(&self) -> AppResult<()> {
        if !self.whisper.model_path.exists() {
            return Err(AppError::ConfigError {
                reason: format!(
                    "Whisper model not found at: {:?}. Download a ggml model and place it there, \
                     or point model_path somewhere else.",
                    self.whisper.model_path
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    /// Save configuration to disk using the atomic write pattern
    /// (temp file + rename) so a crash mid-write cannot corrupt it.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save(&self) -> AppResult<()> {
        let config_path = Self::config_path()?;

        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, &config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config into place: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved");

        Ok(())
    }

    /// Directory for log output, created on demand.
    #[track_caller]
    pub fn log_dir() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let log_dir = proj_dirs.data_dir().join("logs");
        if !log_dir.exists() {
            fs::create_dir_all(&log_dir)?;
        }
        Ok(log_dir)
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("io", "voxkey", "Voxkey").ok_or_else(|| AppError::ConfigError {
            reason: "Failed to determine platform project directories".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn create_default() -> AppResult<Self> {
        let proj_dirs = Self::project_dirs()?;
        let model_path = proj_dirs.data_dir().join("models").join("ggml-small.bin");

        let config = Config {
            whisper: WhisperConfig {
                model_path: model_path.clone(),
                use_gpu: true,
                language: DEFAULT_LANGUAGE.to_string(),
                initial_prompt: None,
            },
            audio: AudioConfig {
                selected_device: None,
            },
            behaviour: BehaviourConfig {
                hold_threshold_ms: DEFAULT_HOLD_THRESHOLD_MS,
                min_recording_ms: DEFAULT_MIN_RECORDING_MS,
                injection_delay_ms: DEFAULT_INJECTION_DELAY_MS,
            },
        };

        config.save()?;

        warn!(
            model_path = ?model_path,
            "Default config created. A whisper model must be downloaded before dictating."
        );

        Ok(config)
    }
}
