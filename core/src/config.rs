use std::path::PathBuf;

use crate::error::{StoreError, StoreResult};

const DEFAULT_DIR_NAME: &str = ".todays";
const LOG_DIR_NAME: &str = "logs";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime settings, resolved once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub sound: bool,
}

impl Config {
    /// Fills unset values with defaults. The data directory falls back to `~/.todays`.
    pub fn resolve(
        data_dir: Option<PathBuf>,
        log_level: Option<String>,
        sound: bool,
    ) -> StoreResult<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => dirs::home_dir()
                .ok_or(StoreError::HomeDirUnavailable)?
                .join(DEFAULT_DIR_NAME),
        };
        Ok(Self {
            log_dir: data_dir.join(LOG_DIR_NAME),
            data_dir,
            log_level: log_level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            sound,
        })
    }
}
