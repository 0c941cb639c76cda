//! Shared helpers for CLI commands.

use waymark::config::ConfigFile;
use waymark::store::SqliteStore;

use crate::error::CliError;

/// Open the marker database at the configured (or default) location,
/// creating its directory if needed.
pub fn open_store(config: &ConfigFile) -> Result<SqliteStore, CliError> {
    let path = config.database_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(SqliteStore::open(&path)?)
}

/// Load the user's config file, falling back to defaults.
pub fn load_config() -> Result<ConfigFile, CliError> {
    Ok(ConfigFile::load()?)
}
