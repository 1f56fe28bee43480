//! TOML-based configuration for the driver.
//!
//! Read from `$XDG_CONFIG_HOME/tourbox/config.toml` (falling back to
//! `~/.config/tourbox/config.toml`) unless a path is given on the command line.
//!
//! ```toml
//! [device]
//! path = "/dev/ttyACM0"
//! baud_rate = 115200
//!
//! [timing]
//! window_ms = 25
//! poll_interval_ms = 2
//!
//! [log]
//! level = "info"
//!
//! [bindings]
//! SIDE = "KEY_CALC"
//! DBL_SIDE = "KEY_SLEEP"
//! WHEEL_DOWN = "REL_WHEEL:2"
//! MOON = "DISABLED"
//! ```
//!
//! # Serde default values
//!
//! Every section and field is optional.  Fields annotated with
//! `#[serde(default = "some_fn")]` take the value of `some_fn()` when absent,
//! so an empty file (or no file at all) yields a working configuration.
//!
//! # Bindings
//!
//! `[bindings]` only lists *overrides*.  Buttons not mentioned keep their
//! factory binding; see [`tourbox_core::BindingTable::factory_default`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tourbox_core::{Binding, BindingError, BindingKey, BindingTable, DEFAULT_WINDOW};

use crate::infrastructure::transport::serial::{DEFAULT_BAUD_RATE, DEFAULT_DEVICE};

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A `[bindings]` entry names no button.
    #[error("unknown button in [bindings]: {0}")]
    UnknownButton(String),

    /// A binding failed table validation.
    #[error("invalid binding: {0}")]
    Binding(#[from] BindingError),

    /// A timing value is out of range.
    #[error("invalid timing: {0}")]
    Timing(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub log: LogConfig,
    /// Binding overrides keyed by button name (`SIDE`, `DBL_SIDE`, …).
    #[serde(default)]
    pub bindings: BTreeMap<String, Binding>,
}

/// Serial device settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    #[serde(default = "default_device_path")]
    pub path: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

/// Decoder and polling timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingConfig {
    /// Double-activation window in milliseconds.
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    /// Sleep between polls in milliseconds.  Must be shorter than the window.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    /// `tracing` level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_device_path() -> String {
    DEFAULT_DEVICE.to_string()
}
fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}
fn default_window_ms() -> u64 {
    DEFAULT_WINDOW.as_millis() as u64
}
fn default_poll_interval_ms() -> u64 {
    2
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: default_device_path(),
            baud_rate: default_baud_rate(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ── Resolution ────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Builds the immutable binding table: factory defaults plus overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownButton`] for an unrecognised key name and
    /// [`ConfigError::Binding`] for a binding that fails validation.
    pub fn binding_table(&self) -> Result<BindingTable, ConfigError> {
        let overrides = self
            .bindings
            .iter()
            .map(|(name, binding)| {
                BindingKey::from_config_name(name.trim())
                    .map(|key| (key, *binding))
                    .ok_or_else(|| ConfigError::UnknownButton(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BindingTable::with_overrides(overrides)?)
    }

    /// The decoder's disambiguation window.
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.timing.window_ms)
    }

    /// The polling interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.timing.poll_interval_ms)
    }

    /// Checks timing values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Timing`] if either value is zero or the poll
    /// interval is not shorter than the window (a confirming byte could then
    /// never be seen in time).
    pub fn validate_timing(&self) -> Result<(), ConfigError> {
        let TimingConfig {
            window_ms,
            poll_interval_ms,
        } = self.timing;
        if window_ms == 0 || poll_interval_ms == 0 {
            return Err(ConfigError::Timing(
                "window_ms and poll_interval_ms must be greater than zero".into(),
            ));
        }
        if poll_interval_ms >= window_ms {
            return Err(ConfigError::Timing(format!(
                "poll_interval_ms ({poll_interval_ms}) must be shorter than window_ms ({window_ms})"
            )));
        }
        Ok(())
    }

    /// A copy of this config whose `[bindings]` lists every entry of `table`.
    pub fn with_effective_bindings(&self, table: &BindingTable) -> Self {
        Self {
            bindings: table
                .iter()
                .map(|(key, binding)| (key.config_name(), binding))
                .collect(),
            ..self.clone()
        }
    }

    /// Serializes to pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when neither
/// `XDG_CONFIG_HOME` nor `HOME` is set.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads the configuration.
///
/// With `path = None` the default location is used and a missing file yields
/// `AppConfig::default()`.  An explicitly given path must exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_config(&content)
        }
        None => {
            let path = config_file_path()?;
            match std::fs::read_to_string(&path) {
                Ok(content) => parse_config(&content),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
                Err(source) => Err(ConfigError::Io { path, source }),
            }
        }
    }
}

/// Parses configuration text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the TOML is malformed.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

fn platform_config_dir() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("tourbox"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
