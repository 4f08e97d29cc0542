use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::config::MeetingConfig;
use crate::currency::{format_currency, format_rate};
use crate::equivalence::Equivalence;

/// Summary of a stopped meeting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingReceipt {
    pub config: MeetingConfig,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub elapsed_seconds: u64,
    pub duration_label: String,
    pub total_cost: f64,
    pub cost_per_attendee: f64,
    pub cost_per_minute: f64,
    pub equivalence: Option<&'static Equivalence>,
    pub samples: usize,
}

impl fmt::Display for MeetingReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let currency = self.config.currency;
        writeln!(f, "MEETING RECEIPT")?;
        if let Some(start) = self.start_time {
            writeln!(f, "  Started:      {}", start.format("%Y-%m-%d %H:%M:%S UTC"))?;
        }
        if let Some(end) = self.end_time {
            writeln!(f, "  Ended:        {}", end.format("%Y-%m-%d %H:%M:%S UTC"))?;
        }
        writeln!(f, "  Duration:     {}", self.duration_label)?;
        writeln!(f, "  Attendees:    {}", self.config.attendees)?;
        writeln!(
            f,
            "  Rate/Person:  {}",
            format_rate(self.config.hourly_rate, currency, "h")
        )?;
        writeln!(
            f,
            "  Burn rate:    {}",
            format_rate(self.cost_per_minute, currency, "min")
        )?;
        writeln!(
            f,
            "  Cost/Person:  {}",
            format_currency(self.cost_per_attendee, currency)
        )?;
        writeln!(
            f,
            "  TOTAL:        {}",
            format_currency(self.total_cost, currency)
        )?;
        match self.equivalence {
            Some(eq) => write!(f, "  You burned:   {} {}", eq.emoji, eq.item),
            None => write!(f, "  You burned:   less than a coffee"),
        }
    }
}
