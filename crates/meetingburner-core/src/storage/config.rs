//! TOML-based application settings.
//!
//! Stores user preferences including:
//! - Defaults pre-filled for a new meeting (attendees, rate, currency)
//! - Tick cadence and cost-history sampling interval
//! - Display preferences
//!
//! Settings are stored at `~/.config/meetingburner/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::currency::Currency;
use crate::error::ConfigError;
use crate::meeting::{MeetingConfig, DEFAULT_SAMPLE_INTERVAL_SECS};
pub use crate::meeting::{MAX_TICK_INTERVAL_MS, MIN_TICK_INTERVAL_MS};

/// Values pre-filled when starting a meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingDefaults {
    #[serde(default = "default_attendees")]
    pub attendees: u32,
    #[serde(default = "default_hourly_rate")]
    pub hourly_rate: f64,
    #[serde(default)]
    pub currency: Currency,
}

/// Tick source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_sample_interval_secs")]
    pub sample_interval_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Use `$1.5k`-style amounts in the live status line.
    #[serde(default)]
    pub short_currency: bool,
}

/// Application settings.
///
/// Serialized to/from TOML at `~/.config/meetingburner/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub meeting: MeetingDefaults,
    #[serde(default)]
    pub timer: TimerSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

fn default_attendees() -> u32 {
    5
}
fn default_hourly_rate() -> f64 {
    60.0
}
fn default_tick_interval_ms() -> u64 {
    100
}
fn default_sample_interval_secs() -> u64 {
    DEFAULT_SAMPLE_INTERVAL_SECS
}

impl Default for MeetingDefaults {
    fn default() -> Self {
        Self {
            attendees: default_attendees(),
            hourly_rate: default_hourly_rate(),
            currency: Currency::Usd,
        }
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            sample_interval_secs: default_sample_interval_secs(),
        }
    }
}

impl Settings {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("not a leaf value".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults there on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    /// Load from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a setting as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Change a setting in memory. The key must already exist and the
    /// value must parse as the key's type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Settings =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Change a setting and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the settings cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.meeting_config()
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                key: "meeting".into(),
                message: e.to_string(),
            })?;
        self.tick_interval()?;
        if self.timer.sample_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.sample_interval_secs".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn meeting_config(&self) -> MeetingConfig {
        MeetingConfig::new(
            self.meeting.attendees,
            self.meeting.hourly_rate,
            self.meeting.currency,
        )
    }

    pub fn tick_interval(&self) -> Result<Duration, ConfigError> {
        let ms = self.timer.tick_interval_ms;
        if !(MIN_TICK_INTERVAL_MS..=MAX_TICK_INTERVAL_MS).contains(&ms) {
            return Err(ConfigError::InvalidValue {
                key: "timer.tick_interval_ms".into(),
                message: format!(
                    "{ms} is outside {MIN_TICK_INTERVAL_MS}..={MAX_TICK_INTERVAL_MS}"
                ),
            });
        }
        Ok(Duration::from_millis(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_roundtrip() {
        let cfg = Settings::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.meeting.attendees, 5);
        assert_eq!(parsed.meeting.currency, Currency::Usd);
        assert_eq!(parsed.timer.tick_interval_ms, 100);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Settings = toml::from_str("[meeting]\ncurrency = \"eur\"\n").unwrap();
        assert_eq!(parsed.meeting.currency, Currency::Eur);
        assert_eq!(parsed.meeting.hourly_rate, 60.0);
        assert_eq!(parsed.timer.sample_interval_secs, 5);
        assert!(!parsed.display.short_currency);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Settings::default();
        assert_eq!(cfg.get("meeting.attendees").as_deref(), Some("5"));
        assert_eq!(cfg.get("meeting.currency").as_deref(), Some("usd"));
        assert_eq!(cfg.get("display.short_currency").as_deref(), Some("false"));
        assert!(cfg.get("meeting.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Settings::default();
        cfg.apply("meeting.attendees", "12").unwrap();
        cfg.apply("meeting.hourly_rate", "82.5").unwrap();
        cfg.apply("meeting.currency", "EUR").unwrap();
        cfg.apply("display.short_currency", "true").unwrap();
        assert_eq!(cfg.meeting.attendees, 12);
        assert_eq!(cfg.meeting.hourly_rate, 82.5);
        assert_eq!(cfg.meeting.currency, Currency::Eur);
        assert!(cfg.display.short_currency);
    }

    #[test]
    fn integer_input_for_float_field() {
        let mut cfg = Settings::default();
        cfg.apply("meeting.hourly_rate", "100").unwrap();
        assert_eq!(cfg.meeting.hourly_rate, 100.0);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Settings::default();
        assert!(matches!(
            cfg.apply("meeting.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(cfg.apply("meeting", "1").is_err());
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Settings::default();
        assert!(cfg.apply("display.short_currency", "maybe").is_err());
        assert!(cfg.apply("meeting.attendees", "lots").is_err());
        assert!(cfg.apply("meeting.currency", "gbp").is_err());
        assert_eq!(cfg.meeting.currency, Currency::Usd);
    }

    #[test]
    fn apply_rejects_values_that_fail_validation() {
        let mut cfg = Settings::default();
        assert!(cfg.apply("meeting.attendees", "0").is_err());
        assert!(cfg.apply("timer.tick_interval_ms", "1000").is_err());
        assert!(cfg.apply("timer.sample_interval_secs", "0").is_err());
        assert_eq!(cfg.meeting.attendees, 5);
        assert_eq!(cfg.timer.tick_interval_ms, 100);
    }

    #[test]
    fn tick_interval_bounds() {
        let mut cfg = Settings::default();
        assert_eq!(cfg.tick_interval().unwrap(), Duration::from_millis(100));
        cfg.timer.tick_interval_ms = 5;
        assert!(cfg.tick_interval().is_err());
        cfg.timer.tick_interval_ms = 200;
        assert!(cfg.tick_interval().is_ok());
    }

    #[test]
    fn save_and_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Settings::default();
        cfg.apply("meeting.attendees", "8").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.meeting.attendees, 8);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "meeting = [").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn load_from_reports_missing_file_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        match Settings::load_from(&path) {
            Err(ConfigError::LoadFailed { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected LoadFailed, got {other:?}"),
        }
    }

    #[test]
    fn meeting_config_uses_defaults() {
        let cfg = Settings::default().meeting_config();
        assert_eq!(cfg, MeetingConfig::default());
    }
}
