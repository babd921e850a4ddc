/// Runtime configuration
///
/// Settings are plain serde structs with defaults. They can be loaded from a
/// JSON file; any field missing from the file keeps its default.
use crate::error::handler::DEFAULT_MAX_HISTORY;
use crate::error::retry::{RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
use crate::error::StateStore;
use crate::io::SafeFileIo;
use crate::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Default file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub handler: HandlerConfig,
    pub io: IoConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// History capacity; oldest records are evicted beyond it
    pub max_history: usize,

    /// Start with automatic notifications disabled (batch/headless runs)
    pub suppress_dialogs: bool,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            suppress_dialogs: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub temp_prefix: String,
    pub temp_suffix: String,
}

impl IoConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
            temp_prefix: crate::io::DEFAULT_TEMP_PREFIX.to_string(),
            temp_suffix: crate::io::DEFAULT_TEMP_SUFFIX.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Load from `path` if given, else from the default location if it exists, else defaults
    pub fn load_or_default(path: Option<&Path>) -> AppResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_json(content: &str) -> AppResult<Self> {
        let settings: Settings = serde_json::from_str(content)
            .map_err(|e| AppError::Configuration(format!("invalid settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.handler.max_history == 0 {
            return Err(AppError::Configuration(
                "handler.max_history must be at least 1".to_string(),
            ));
        }
        if self.io.max_retries == 0 {
            return Err(AppError::Configuration(
                "io.max_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Persists the live settings when the error handler performs an emergency save
pub struct SettingsStore {
    settings: Mutex<Settings>,
    path: PathBuf,
    io: SafeFileIo,
}

impl SettingsStore {
    pub fn new(settings: Settings, path: impl Into<PathBuf>) -> Self {
        let io = SafeFileIo::new(settings.io.retry_policy());
        Self {
            settings: Mutex::new(settings),
            path: path.into(),
            io,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current snapshot
    pub fn settings(&self) -> Settings {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the snapshot that the next save will write
    pub fn update(&self, settings: Settings) {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner) = settings;
    }
}

impl StateStore for SettingsStore {
    fn name(&self) -> &str {
        "settings"
    }

    fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.settings())?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !self.io.ensure_directory(parent) {
                anyhow::bail!("cannot create {}", parent.display());
            }
        }
        if !self.io.safe_write(&self.path, &json) {
            anyhow::bail!("cannot write settings to {}", self.path.display());
        }
        tracing::debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

/// `<config dir>/faultline/config.json` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "faultline")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
