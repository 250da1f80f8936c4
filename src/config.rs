//! Configuration file handling
//!
//! Settings live in `~/.config/padlink/config.toml`. A default
//! file is written on first start; every field falls back to its default when
//! missing, so partial files are valid.

use crate::controller::DEFAULT_SETTLE_INTERVAL;
use crate::error::PadError;
use crate::sequence::MAX_REPEAT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = "padlink";
const CONFIG_FILE: &str = "config.toml";

/// Baud rate the receiving firmware listens at
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub timing: TimingConfig,
    pub wake: WakeConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SerialConfig {
    /// Fixed device path; when unset the port is discovered at startup
    pub port: Option<String>,
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Pause before every packet write
    pub settle_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_interval_ms: DEFAULT_SETTLE_INTERVAL.as_millis() as u64,
        }
    }
}

impl TimingConfig {
    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_interval_ms)
    }
}

/// Timings of the wake sequence (tap L a few times, then confirm twice with A)
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WakeConfig {
    pub shoulder_taps: u32,
    pub first_pause_ms: u64,
    pub second_pause_ms: u64,
    pub final_pause_ms: u64,
}

impl Default for WakeConfig {
    fn default() -> Self {
        Self {
            shoulder_taps: 4,
            first_pause_ms: 500,
            second_pause_ms: 500,
            final_pause_ms: 2000,
        }
    }
}

impl Config {
    /// `<config dir>/padlink/config.toml`, or relative to the working directory
    /// when the platform has no config dir
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| {
            warn!("Could not determine config directory, using current directory");
            PathBuf::from(".")
        });
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, PadError> {
        let config: Self = toml::from_str(content).map_err(|e| PadError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        if config.wake.shoulder_taps > MAX_REPEAT {
            return Err(PadError::Config {
                path: origin.to_path_buf(),
                message: format!(
                    "wake.shoulder_taps is {}, at most {} are allowed",
                    config.wake.shoulder_taps, MAX_REPEAT
                ),
            });
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, PadError> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| PadError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content, path)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Writes the default configuration to `path` unless a file already exists
    pub fn ensure_default(path: &Path) -> Result<(), PadError> {
        if path.exists() {
            debug!("Config file {} already exists", path.display());
            return Ok(());
        }

        let io_err = |source| PadError::ConfigIo {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let defaults = Config::default();
        let content = toml::to_string_pretty(&defaults).map_err(|e| PadError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, content).map_err(io_err)?;
        info!("Wrote default config to {}", path.display());
        Ok(())
    }

    /// Loads `path`, creating it with defaults first if it is missing
    pub fn load_or_create(path: &Path) -> Result<Self, PadError> {
        Self::ensure_default(path)?;
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.serial.port, None);
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.timing.settle_interval(), Duration::from_millis(70));
        assert_eq!(config.wake.shoulder_taps, 4);
        assert_eq!(config.wake.final_pause_ms, 2000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml_str(
            "[serial]\nport = \"/dev/ttyACM0\"\n\n[timing]\nsettle_interval_ms = 90\n",
            Path::new("inline.toml"),
        )
        .unwrap();
        assert_eq!(config.serial.port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.timing.settle_interval_ms, 90);
        assert_eq!(config.wake, WakeConfig::default());
    }

    #[test]
    fn test_invalid_file_names_the_path() {
        let err = Config::from_toml_str(
            "[timing]\nsettle_interval_ms = \"slow\"",
            Path::new("bad.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, PadError::Config { ref path, .. } if path == Path::new("bad.toml")));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_too_many_shoulder_taps() {
        let err = Config::from_toml_str(
            "[wake]\nshoulder_taps = 4000000000\n",
            Path::new("wake.toml"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PadError::Config { ref message, .. } if message.contains("shoulder_taps")
        ));
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_ensure_default_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[wake]\nshoulder_taps = 2\n").unwrap();

        Config::ensure_default(&path).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.wake.shoulder_taps, 2);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, PadError::ConfigIo { .. }));
    }
}
