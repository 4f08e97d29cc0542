//! Time sources for the meeting engine.
//!
//! Elapsed-time math only ever reads [`Clock::monotonic_ms`]. Wall-clock
//! time is used for the start/end timestamps shown to the user and is
//! never subtracted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Milliseconds since an arbitrary fixed origin. Never goes backwards.
    fn monotonic_ms(&self) -> u64;

    /// Current wall-clock time, for display only.
    fn wall_now(&self) -> DateTime<Utc>;
}

/// Real time: `Instant` for elapsed math, `Utc::now()` for timestamps.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn monotonic_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn wall_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for tests and offline simulation.
///
/// Clones share the same counter, so a test can keep one handle and give
/// another to the engine.
#[derive(Debug, Clone)]
pub struct ManualClock {
    offset_ms: Arc<AtomicU64>,
    wall_base: DateTime<Utc>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::with_wall_base(Utc::now())
    }

    pub fn with_wall_base(wall_base: DateTime<Utc>) -> Self {
        Self {
            offset_ms: Arc::new(AtomicU64::new(0)),
            wall_base,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.advance_ms(by.as_millis() as u64);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.offset_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn monotonic_ms(&self) -> u64 {
        self.offset_ms.load(Ordering::SeqCst)
    }

    fn wall_now(&self) -> DateTime<Utc> {
        self.wall_base + chrono::Duration::milliseconds(self.monotonic_ms() as i64)
    }
}
