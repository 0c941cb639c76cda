//! Application configuration for [`super::App`].

use crate::config::ConfigFile;
use crate::proximity::ProximityConfig;
use crate::telemetry::logging::LogConfig;

/// Top-level configuration combining all component configs.
///
/// This is the configuration passed to `App::start()`. It keeps every
/// component configured from one place, whether built programmatically or
/// from the user's config file.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Proximity engine configuration.
    pub proximity: ProximityConfig,

    /// Logging configuration (consumed by the binary, carried here so one
    /// config file load covers everything).
    pub logging: LogConfig,
}

impl AppConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the user's config file.
    pub fn from_config_file(file: &ConfigFile) -> Self {
        Self {
            proximity: ProximityConfig::default().with_threshold_meters(file.threshold_meters),
            logging: LogConfig {
                file: file.log_file.clone(),
            },
        }
    }

    /// Override the proximity threshold.
    pub fn with_threshold_meters(mut self, meters: f64) -> Self {
        self.proximity.threshold_meters = meters;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_file_carries_threshold() {
        let mut file = ConfigFile::default();
        file.threshold_meters = 42.0;

        let config = AppConfig::from_config_file(&file);
        assert_eq!(config.proximity.threshold_meters, 42.0);
    }
}
