//! Application error types.

use std::fmt;

use crate::config::ConfigError;
use crate::notify::SinkError;
use crate::store::StoreError;

/// Errors that can occur during application lifecycle.
#[derive(Debug)]
pub enum AppError {
    /// Marker storage failed.
    Store(StoreError),

    /// Notification delivery or cancellation failed.
    Notification(SinkError),

    /// Configuration error.
    Config(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Store(e) => {
                write!(f, "Marker storage failed: {}", e)
            }
            AppError::Notification(e) => {
                write!(f, "Notification sink failed: {}", e)
            }
            AppError::Config(e) => {
                write!(f, "Configuration error: {}", e)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Store(e) => Some(e),
            AppError::Notification(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl From<SinkError> for AppError {
    fn from(e: SinkError) -> Self {
        AppError::Notification(e)
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}
