mod clock;
mod config;
mod engine;
mod history;
mod receipt;
mod ticker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{clamp_attendees, preset, MeetingConfig, RatePreset, MAX_ATTENDEES, RATE_PRESETS};
pub use engine::{MeetingEngine, MeetingSnapshot, MeetingState, DEFAULT_SAMPLE_INTERVAL_SECS};
pub use history::{format_time, CostSample};
pub use receipt::MeetingReceipt;
pub use ticker::{
    MeetingTimer, DEFAULT_TICK_INTERVAL, MAX_TICK_INTERVAL_MS, MIN_TICK_INTERVAL_MS,
};
