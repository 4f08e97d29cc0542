use clap::Args;
use meetingburner_core::meeting::{clamp_attendees, preset};
use meetingburner_core::{Currency, MeetingConfig, Settings};

/// Meeting parameters shared by `run` and `simulate`. Unset values fall
/// back to the `[meeting]` section of the settings file.
#[derive(Args, Debug, Clone)]
pub struct MeetingArgs {
    /// Number of attendees (clamped to 1..=100)
    #[arg(short, long)]
    pub attendees: Option<i64>,
    /// Average hourly rate per attendee
    #[arg(short, long, conflicts_with = "preset")]
    pub rate: Option<f64>,
    /// Hourly rate preset (intern, dev, manager, exec)
    #[arg(short, long)]
    pub preset: Option<String>,
    /// Currency used for display (usd or eur)
    #[arg(short, long)]
    pub currency: Option<Currency>,
}

impl MeetingArgs {
    pub fn resolve(
        &self,
        settings: &Settings,
    ) -> Result<MeetingConfig, Box<dyn std::error::Error>> {
        let defaults = settings.meeting_config();

        let attendees = self
            .attendees
            .map(clamp_attendees)
            .unwrap_or(defaults.attendees);

        let hourly_rate = match (&self.preset, self.rate) {
            (Some(name), _) => {
                preset(name)
                    .ok_or_else(|| format!("unknown preset: {name}"))?
                    .hourly_rate
            }
            (None, Some(rate)) => rate,
            (None, None) => defaults.hourly_rate,
        };

        let config = MeetingConfig::new(
            attendees,
            hourly_rate,
            self.currency.unwrap_or(defaults.currency),
        );
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> MeetingArgs {
        MeetingArgs {
            attendees: None,
            rate: None,
            preset: None,
            currency: None,
        }
    }

    #[test]
    fn falls_back_to_settings() {
        let cfg = args().resolve(&Settings::default()).unwrap();
        assert_eq!(cfg, MeetingConfig::default());
    }

    #[test]
    fn preset_sets_rate() {
        let mut a = args();
        a.preset = Some("manager".into());
        assert_eq!(a.resolve(&Settings::default()).unwrap().hourly_rate, 100.0);

        a.preset = Some("ceo".into());
        assert!(a.resolve(&Settings::default()).is_err());
    }

    #[test]
    fn attendees_are_clamped() {
        let mut a = args();
        a.attendees = Some(500);
        assert_eq!(a.resolve(&Settings::default()).unwrap().attendees, 100);
    }

    #[test]
    fn non_positive_rate_is_rejected() {
        let mut a = args();
        a.rate = Some(0.0);
        assert!(a.resolve(&Settings::default()).is_err());
    }
}
