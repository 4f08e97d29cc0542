use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::equivalence::Equivalence;
use crate::meeting::{CostSample, MeetingConfig};

/// Every state change of a meeting produces an Event.
/// The presentation layer either polls snapshots or subscribes to these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    MeetingStarted {
        config: MeetingConfig,
        cost_per_second: f64,
        at: DateTime<Utc>,
    },
    MeetingPaused {
        elapsed_seconds: u64,
        total_cost: f64,
        at: DateTime<Utc>,
    },
    MeetingResumed {
        elapsed_seconds: u64,
        at: DateTime<Utc>,
    },
    MeetingStopped {
        elapsed_seconds: u64,
        total_cost: f64,
        at: DateTime<Utc>,
    },
    MeetingReset {
        at: DateTime<Utc>,
    },
    /// A point was appended to the cost history.
    SampleRecorded {
        sample: CostSample,
    },
    /// Accrued cost crossed into a higher equivalence milestone.
    EquivalenceReached {
        equivalence: &'static Equivalence,
        total_cost: f64,
        elapsed_seconds: u64,
    },
}
