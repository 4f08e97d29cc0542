use serde::{Deserialize, Serialize};

use crate::currency::Currency;
use crate::error::ValidationError;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Largest attendee count the input helpers will hand out.
pub const MAX_ATTENDEES: u32 = 100;

/// Parameters of one meeting run. Fixed from `start` until `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeetingConfig {
    pub attendees: u32,
    /// Cost per attendee per hour.
    pub hourly_rate: f64,
    #[serde(default)]
    pub currency: Currency,
}

impl MeetingConfig {
    pub fn new(attendees: u32, hourly_rate: f64, currency: Currency) -> Self {
        Self {
            attendees,
            hourly_rate,
            currency,
        }
    }

    /// Reject configurations the engine cannot accrue against.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.attendees == 0 {
            return Err(ValidationError::InvalidConfiguration {
                field: "attendees".into(),
                message: "must be at least 1".into(),
            });
        }
        if !self.hourly_rate.is_finite() || self.hourly_rate <= 0.0 {
            return Err(ValidationError::InvalidConfiguration {
                field: "hourly_rate".into(),
                message: format!("must be a positive number, got {}", self.hourly_rate),
            });
        }
        Ok(())
    }

    pub fn cost_per_second(&self) -> f64 {
        self.cost_per_hour() / SECONDS_PER_HOUR
    }

    /// The "burning at X/min" figure.
    pub fn cost_per_minute(&self) -> f64 {
        self.cost_per_hour() / 60.0
    }

    pub fn cost_per_hour(&self) -> f64 {
        f64::from(self.attendees) * self.hourly_rate
    }
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            attendees: 5,
            hourly_rate: 60.0,
            currency: Currency::Usd,
        }
    }
}

/// Clamp free-form attendee input into `1..=MAX_ATTENDEES`.
pub fn clamp_attendees(n: i64) -> u32 {
    n.clamp(1, i64::from(MAX_ATTENDEES)) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatePreset {
    pub label: &'static str,
    pub hourly_rate: f64,
}

pub static RATE_PRESETS: [RatePreset; 4] = [
    RatePreset {
        label: "Intern",
        hourly_rate: 15.0,
    },
    RatePreset {
        label: "Dev",
        hourly_rate: 60.0,
    },
    RatePreset {
        label: "Manager",
        hourly_rate: 100.0,
    },
    RatePreset {
        label: "Exec",
        hourly_rate: 250.0,
    },
];

/// Case-insensitive preset lookup by label.
pub fn preset(name: &str) -> Option<&'static RatePreset> {
    RATE_PRESETS
        .iter()
        .find(|p| p.label.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_per_second_matches_formula() {
        let cfg = MeetingConfig::new(5, 60.0, Currency::Usd);
        assert_eq!(cfg.cost_per_second(), 5.0 * 60.0 / 3600.0);
        assert_eq!(cfg.cost_per_minute(), 5.0);
        assert_eq!(cfg.cost_per_hour(), 300.0);
    }

    #[test]
    fn zero_attendees_rejected() {
        let err = MeetingConfig::new(0, 60.0, Currency::Usd)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidConfiguration { ref field, .. } if field == "attendees"
        ));
    }

    #[test]
    fn non_positive_rate_rejected() {
        for rate in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            assert!(MeetingConfig::new(3, rate, Currency::Eur).validate().is_err());
        }
    }

    #[test]
    fn clamp_keeps_attendees_in_range() {
        assert_eq!(clamp_attendees(-4), 1);
        assert_eq!(clamp_attendees(0), 1);
        assert_eq!(clamp_attendees(12), 12);
        assert_eq!(clamp_attendees(5000), MAX_ATTENDEES);
    }

    #[test]
    fn presets_lookup_ignores_case() {
        assert_eq!(preset("dev").unwrap().hourly_rate, 60.0);
        assert_eq!(preset(" EXEC ").unwrap().hourly_rate, 250.0);
        assert!(preset("ceo").is_none());
    }

    #[test]
    fn currency_defaults_when_missing() {
        let cfg: MeetingConfig =
            serde_json::from_str(r#"{"attendees":2,"hourly_rate":40.0}"#).unwrap();
        assert_eq!(cfg.currency, Currency::Usd);
    }
}
