//! Configuration file handling.
//!
//! Settings live in an INI file at `~/.config/waymark/config.ini`:
//!
//! ```ini
//! [proximity]
//! threshold = 100.0
//!
//! [storage]
//! database = /home/user/.local/share/waymark/markers.db
//!
//! [logging]
//! file = /home/user/.local/state/waymark/waymark.log
//! ```
//!
//! Every setting has a default; a missing file or missing key is not an
//! error. The CLI's `config get/set/list/path` commands address settings by
//! `section.key` strings via [`ConfigKey`].

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

use crate::proximity::DEFAULT_THRESHOLD_METERS;

/// Errors raised while reading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("No configuration directory available")]
    NoConfigDir,

    /// The file exists but could not be parsed.
    #[error("Failed to parse config file: {0}")]
    Parse(String),

    /// Reading or writing the file failed.
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value does not parse for its key.
    #[error("Invalid value '{value}' for key '{key}'")]
    InvalidValue { key: String, value: String },
}

/// Directory holding the config file (`~/.config/waymark`).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("waymark"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Full path of the config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.ini"))
}

/// Default marker database location (`~/.local/share/waymark/markers.db`).
pub fn default_database_path() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join("waymark").join("markers.db"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Typed view of the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    /// Proximity threshold in meters.
    pub threshold_meters: f64,
    /// Marker database path. None falls back to the default location.
    pub database: Option<PathBuf>,
    /// Log file path. None logs to stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            threshold_meters: DEFAULT_THRESHOLD_METERS,
            database: None,
            log_file: None,
        }
    }
}

impl ConfigFile {
    /// Load from the default location. Missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        if let Some(value) = ini.get_from(Some("proximity"), "threshold") {
            config.threshold_meters =
                value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "proximity.threshold".to_string(),
                    value: value.to_string(),
                })?;
        }
        if let Some(value) = ini.get_from(Some("storage"), "database") {
            config.database = Some(PathBuf::from(value));
        }
        if let Some(value) = ini.get_from(Some("logging"), "file") {
            config.log_file = Some(PathBuf::from(value));
        }

        Ok(config)
    }

    /// Write to the default location, creating the directory if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        let dir = config_dir()?;
        std::fs::create_dir_all(&dir)?;
        self.save_to(&dir.join("config.ini"))
    }

    /// Write to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let mut ini = Ini::new();

        ini.with_section(Some("proximity"))
            .set("threshold", self.threshold_meters.to_string());
        if let Some(database) = &self.database {
            ini.with_section(Some("storage"))
                .set("database", database.display().to_string());
        }
        if let Some(log_file) = &self.log_file {
            ini.with_section(Some("logging"))
                .set("file", log_file.display().to_string());
        }

        ini.write_to_file(path)?;
        Ok(())
    }

    /// The database path to use, falling back to the default location.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => default_database_path(),
        }
    }
}

/// A settable configuration key, addressed as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    /// `proximity.threshold` - proximity threshold in meters.
    ProximityThreshold,
    /// `storage.database` - marker database path.
    StorageDatabase,
    /// `logging.file` - log file path.
    LoggingFile,
}

impl ConfigKey {
    /// All known keys, for `config list`.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ProximityThreshold,
            ConfigKey::StorageDatabase,
            ConfigKey::LoggingFile,
        ]
    }

    /// Current value of this key, empty string when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ProximityThreshold => config.threshold_meters.to_string(),
            ConfigKey::StorageDatabase => config
                .database
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            ConfigKey::LoggingFile => config
                .log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Set this key from a string value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when the value does not parse.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        match self {
            ConfigKey::ProximityThreshold => {
                let meters: f64 = value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: self.to_string(),
                    value: value.to_string(),
                })?;
                if !meters.is_finite() || meters <= 0.0 {
                    return Err(ConfigError::InvalidValue {
                        key: self.to_string(),
                        value: value.to_string(),
                    });
                }
                config.threshold_meters = meters;
            }
            ConfigKey::StorageDatabase => {
                config.database = Some(PathBuf::from(value));
            }
            ConfigKey::LoggingFile => {
                config.log_file = Some(PathBuf::from(value));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConfigKey::ProximityThreshold => "proximity.threshold",
            ConfigKey::StorageDatabase => "storage.database",
            ConfigKey::LoggingFile => "logging.file",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ConfigKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proximity.threshold" => Ok(ConfigKey::ProximityThreshold),
            "storage.database" => Ok(ConfigKey::StorageDatabase),
            "logging.file" => Ok(ConfigKey::LoggingFile),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_file_missing() {
        let config = ConfigFile::default();
        assert_eq!(config.threshold_meters, DEFAULT_THRESHOLD_METERS);
        assert!(config.database.is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.threshold_meters = 250.0;
        config.database = Some(PathBuf::from("/tmp/markers.db"));
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded.threshold_meters, 250.0);
        assert_eq!(loaded.database, Some(PathBuf::from("/tmp/markers.db")));
        assert!(loaded.log_file.is_none());
    }

    #[test]
    fn test_invalid_threshold_in_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[proximity]\nthreshold = not-a-number\n").unwrap();

        assert!(matches!(
            ConfigFile::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_config_key_parse_and_display() {
        for key in ConfigKey::all() {
            let parsed: ConfigKey = key.to_string().parse().unwrap();
            assert_eq!(parsed, *key);
        }
        assert!("nonsense.key".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn test_set_threshold_rejects_non_positive() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::ProximityThreshold.set(&mut config, "0").is_err());
        assert!(ConfigKey::ProximityThreshold.set(&mut config, "-5").is_err());
        assert!(ConfigKey::ProximityThreshold.set(&mut config, "150").is_ok());
        assert_eq!(config.threshold_meters, 150.0);
    }
}
