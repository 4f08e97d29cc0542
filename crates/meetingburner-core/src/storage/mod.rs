mod config;

pub use config::{
    DisplaySettings, MeetingDefaults, Settings, TimerSettings, MAX_TICK_INTERVAL_MS,
    MIN_TICK_INTERVAL_MS,
};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/meetingburner[-dev]/` based on MEETINGBURNER_ENV.
///
/// Set MEETINGBURNER_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MEETINGBURNER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("meetingburner-dev")
    } else {
        base_dir.join("meetingburner")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
