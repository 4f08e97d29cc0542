//! Meeting cost engine.
//!
//! The engine is a clock-driven state machine. It does not use internal
//! threads - the caller (or [`MeetingTimer`](super::MeetingTimer)) is
//! responsible for calling `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Active <-> Paused
//!           |          |
//!           +-> Stopped <-+        reset: any -> Idle
//! ```
//!
//! Elapsed time is never accumulated tick by tick. Each tick recomputes it
//! from two anchors: the duration folded in from closed segments and the
//! monotonic start of the open segment.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = MeetingEngine::new();
//! engine.start(MeetingConfig::default())?;
//! // In a loop:
//! for event in engine.tick() { /* samples, milestones */ }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::clock::{Clock, SystemClock};
use super::config::MeetingConfig;
use super::history::{format_time, CostSample};
use super::receipt::MeetingReceipt;
use crate::equivalence::{current_equivalence, Equivalence, Progress};
use crate::error::{Result, TransitionError};
use crate::events::Event;

/// Seconds between cost-history samples.
pub const DEFAULT_SAMPLE_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingState {
    Idle,
    Active,
    Paused,
    /// Finished. Figures stay readable until `reset`.
    Stopped,
}

impl fmt::Display for MeetingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MeetingState::Idle => "idle",
            MeetingState::Active => "active",
            MeetingState::Paused => "paused",
            MeetingState::Stopped => "stopped",
        })
    }
}

/// Everything a display needs in one serialisable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingSnapshot {
    pub state: MeetingState,
    pub is_running: bool,
    pub is_paused: bool,
    pub config: Option<MeetingConfig>,
    pub elapsed_seconds: u64,
    pub elapsed_label: String,
    pub total_cost: f64,
    pub cost_per_second: f64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub equivalence: Progress,
    pub samples: usize,
}

#[derive(Debug, Clone)]
pub struct MeetingEngine {
    clock: Arc<dyn Clock>,
    sample_interval_secs: u64,
    state: MeetingState,
    config: Option<MeetingConfig>,
    cost_per_second: f64,
    /// Active time from closed segments.
    accumulated_ms: u64,
    /// Monotonic start of the open segment. `Some` only while Active.
    segment_start_ms: Option<u64>,
    elapsed_seconds: u64,
    total_cost: f64,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    history: Vec<CostSample>,
    last_sampled_second: u64,
    milestone: Option<&'static Equivalence>,
}

impl MeetingEngine {
    /// Engine on the real system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            sample_interval_secs: DEFAULT_SAMPLE_INTERVAL_SECS,
            state: MeetingState::Idle,
            config: None,
            cost_per_second: 0.0,
            accumulated_ms: 0,
            segment_start_ms: None,
            elapsed_seconds: 0,
            total_cost: 0.0,
            start_time: None,
            end_time: None,
            history: Vec::new(),
            last_sampled_second: 0,
            milestone: None,
        }
    }

    /// Override the sampling cadence. Values below one second are raised to one.
    pub fn with_sample_interval(mut self, secs: u64) -> Self {
        self.sample_interval_secs = secs.max(1);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> MeetingState {
        self.state
    }

    /// True from `start` until `stop`/`reset`, paused or not.
    pub fn is_running(&self) -> bool {
        matches!(self.state, MeetingState::Active | MeetingState::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.state == MeetingState::Paused
    }

    pub fn config(&self) -> Option<&MeetingConfig> {
        self.config.as_ref()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn cost_per_second(&self) -> f64 {
        self.cost_per_second
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn history(&self) -> &[CostSample] {
        &self.history
    }

    pub fn sample_interval_secs(&self) -> u64 {
        self.sample_interval_secs
    }

    /// Exact active time, including the open segment up to now.
    pub fn active_duration(&self) -> Duration {
        Duration::from_millis(self.active_ms())
    }

    pub fn cost_per_attendee(&self) -> f64 {
        match self.config {
            Some(cfg) if cfg.attendees > 0 => self.total_cost / f64::from(cfg.attendees),
            _ => 0.0,
        }
    }

    pub fn snapshot(&self) -> MeetingSnapshot {
        MeetingSnapshot {
            state: self.state,
            is_running: self.is_running(),
            is_paused: self.is_paused(),
            config: self.config,
            elapsed_seconds: self.elapsed_seconds,
            elapsed_label: format_time(self.elapsed_seconds),
            total_cost: self.total_cost,
            cost_per_second: self.cost_per_second,
            start_time: self.start_time,
            end_time: self.end_time,
            equivalence: Progress::at(self.total_cost),
            samples: self.history.len(),
        }
    }

    /// Summary of a finished meeting. `None` unless Stopped.
    pub fn receipt(&self) -> Option<MeetingReceipt> {
        if self.state != MeetingState::Stopped {
            return None;
        }
        let config = self.config?;
        Some(MeetingReceipt {
            config,
            start_time: self.start_time,
            end_time: self.end_time,
            elapsed_seconds: self.elapsed_seconds,
            duration_label: format_time(self.elapsed_seconds),
            total_cost: self.total_cost,
            cost_per_attendee: self.cost_per_attendee(),
            cost_per_minute: config.cost_per_minute(),
            equivalence: current_equivalence(self.total_cost),
            samples: self.history.len(),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a fresh run. Allowed from Idle or Stopped.
    pub fn start(&mut self, config: MeetingConfig) -> Result<Event> {
        self.require("start", &[MeetingState::Idle, MeetingState::Stopped])?;
        config.validate()?;

        let now = self.clock.monotonic_ms();
        let at = self.clock.wall_now();

        self.config = Some(config);
        self.cost_per_second = config.cost_per_second();
        self.accumulated_ms = 0;
        self.segment_start_ms = Some(now);
        self.elapsed_seconds = 0;
        self.total_cost = 0.0;
        self.start_time = Some(at);
        self.end_time = None;
        self.history = vec![CostSample::zero()];
        self.last_sampled_second = 0;
        self.milestone = None;
        self.state = MeetingState::Active;

        debug!(
            attendees = config.attendees,
            hourly_rate = config.hourly_rate,
            cost_per_second = self.cost_per_second,
            "meeting started"
        );
        Ok(Event::MeetingStarted {
            config,
            cost_per_second: self.cost_per_second,
            at,
        })
    }

    /// Freeze accrual. Published figures stay at their last ticked values.
    pub fn pause(&mut self) -> Result<Event> {
        self.require("pause", &[MeetingState::Active])?;
        self.close_segment();
        self.state = MeetingState::Paused;

        debug!(accumulated_ms = self.accumulated_ms, "meeting paused");
        Ok(Event::MeetingPaused {
            elapsed_seconds: self.elapsed_seconds,
            total_cost: self.total_cost,
            at: self.clock.wall_now(),
        })
    }

    pub fn resume(&mut self) -> Result<Event> {
        self.require("resume", &[MeetingState::Paused])?;
        self.segment_start_ms = Some(self.clock.monotonic_ms());
        self.state = MeetingState::Active;

        debug!(accumulated_ms = self.accumulated_ms, "meeting resumed");
        Ok(Event::MeetingResumed {
            elapsed_seconds: self.elapsed_seconds,
            at: self.clock.wall_now(),
        })
    }

    /// End the run. Final figures are the last ticked values.
    pub fn stop(&mut self) -> Result<Event> {
        self.require("stop", &[MeetingState::Active, MeetingState::Paused])?;
        self.close_segment();
        let at = self.clock.wall_now();
        self.end_time = Some(at);
        self.state = MeetingState::Stopped;

        debug!(
            elapsed_seconds = self.elapsed_seconds,
            total_cost = self.total_cost,
            "meeting stopped"
        );
        Ok(Event::MeetingStopped {
            elapsed_seconds: self.elapsed_seconds,
            total_cost: self.total_cost,
            at,
        })
    }

    /// Back to Idle from anywhere, discarding the run.
    pub fn reset(&mut self) -> Event {
        self.state = MeetingState::Idle;
        self.config = None;
        self.cost_per_second = 0.0;
        self.accumulated_ms = 0;
        self.segment_start_ms = None;
        self.elapsed_seconds = 0;
        self.total_cost = 0.0;
        self.start_time = None;
        self.end_time = None;
        self.history.clear();
        self.last_sampled_second = 0;
        self.milestone = None;

        debug!("meeting reset");
        Event::MeetingReset {
            at: self.clock.wall_now(),
        }
    }

    /// Call periodically. Recomputes elapsed time and cost, and returns any
    /// samples or milestones produced. Does nothing unless Active.
    pub fn tick(&mut self) -> Vec<Event> {
        if self.state != MeetingState::Active {
            return Vec::new();
        }

        let active_ms = self.active_ms();
        self.elapsed_seconds = active_ms / 1000;
        self.total_cost = self.cost_per_second * active_ms as f64 / 1000.0;

        let mut events = self.record_samples();
        if let Some(event) = self.check_milestone() {
            events.push(event);
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn require(&self, operation: &'static str, allowed: &[MeetingState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition {
                operation,
                state: self.state,
            }
            .into())
        }
    }

    fn active_ms(&self) -> u64 {
        let open = self
            .segment_start_ms
            .map(|start| self.clock.monotonic_ms().saturating_sub(start))
            .unwrap_or(0);
        self.accumulated_ms + open
    }

    fn close_segment(&mut self) {
        if let Some(start) = self.segment_start_ms.take() {
            let now = self.clock.monotonic_ms();
            self.accumulated_ms += now.saturating_sub(start);
        }
    }

    /// Append one sample per interval boundary crossed since the last one.
    ///
    /// The boundary that equals the current second carries the tick's own
    /// cost; boundaries a slow tick jumped over get the exact cost at that
    /// second.
    fn record_samples(&mut self) -> Vec<Event> {
        let step = self.sample_interval_secs;
        let latest = self.elapsed_seconds / step * step;
        let mut events = Vec::new();

        let mut t = self.last_sampled_second + step;
        while t <= latest {
            let cost = if t == self.elapsed_seconds {
                self.total_cost
            } else {
                self.cost_per_second * t as f64
            };
            let sample = CostSample::new(t, cost);
            trace!(time = t, cost, "cost sample");
            self.history.push(sample.clone());
            self.last_sampled_second = t;
            events.push(Event::SampleRecorded { sample });
            t += step;
        }
        events
    }

    fn check_milestone(&mut self) -> Option<Event> {
        let current = current_equivalence(self.total_cost)?;
        let advanced = self
            .milestone
            .map_or(true, |m| current.threshold > m.threshold);
        if !advanced {
            return None;
        }
        self.milestone = Some(current);
        info!(
            item = current.item,
            threshold = current.threshold,
            "equivalence reached"
        );
        Some(Event::EquivalenceReached {
            equivalence: current,
            total_cost: self.total_cost,
            elapsed_seconds: self.elapsed_seconds,
        })
    }
}

impl Default for MeetingEngine {
    fn default() -> Self {
        Self::new()
    }
}
