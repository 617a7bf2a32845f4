mod config;
pub mod database;
pub mod migrations;
mod store;

pub use config::{Config, HistoryConfig, LoggingConfig, TimerConfig};
pub use database::Database;
pub use store::{day_key, MemoryStore, SessionStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `WORKLOG_DATA_DIR` overrides the location outright. Otherwise
/// `~/.config/worklog[-dev]/`, with `WORKLOG_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("WORKLOG_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("WORKLOG_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("worklog-dev")
            } else {
                base_dir.join("worklog")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
