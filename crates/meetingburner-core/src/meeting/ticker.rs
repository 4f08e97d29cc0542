//! Background tick source for a [`MeetingEngine`].
//!
//! At most one tokio task ticks the engine at a time. Every lifecycle call
//! bumps a generation counter under the same lock that guards the engine,
//! and a tick task only touches the engine while its generation is current.
//! Once `pause`, `stop` or `reset` returns, no tick can act on the engine,
//! even if the aborted task was already waiting on the lock.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::config::MeetingConfig;
use super::engine::{MeetingEngine, MeetingSnapshot};
use super::history::CostSample;
use super::receipt::MeetingReceipt;
use crate::error::{CoreError, Result};
use crate::events::Event;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Tick cadence bounds. Anything slower risks visibly missing a sample boundary.
pub const MIN_TICK_INTERVAL_MS: u64 = 10;
pub const MAX_TICK_INTERVAL_MS: u64 = 200;

const EVENT_CAPACITY: usize = 256;

#[derive(Debug)]
struct Shared {
    engine: MeetingEngine,
    generation: u64,
}

/// A meeting engine plus the task that keeps it ticking.
#[derive(Debug)]
pub struct MeetingTimer {
    shared: Arc<Mutex<Shared>>,
    tick_interval: Duration,
    events: broadcast::Sender<Event>,
    task: Option<JoinHandle<()>>,
}

impl MeetingTimer {
    pub fn new(engine: MeetingEngine) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Mutex::new(Shared {
                engine,
                generation: 0,
            })),
            tick_interval: DEFAULT_TICK_INTERVAL,
            events,
            task: None,
        }
    }

    /// Tick cadence for subsequent `start`/`resume` calls, clamped to
    /// `MIN_TICK_INTERVAL_MS..=MAX_TICK_INTERVAL_MS`.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.clamp(
            Duration::from_millis(MIN_TICK_INTERVAL_MS),
            Duration::from_millis(MAX_TICK_INTERVAL_MS),
        );
        self
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Lifecycle events and tick output, in the order they happened.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> MeetingSnapshot {
        self.shared.lock().engine.snapshot()
    }

    pub fn history(&self) -> Vec<CostSample> {
        self.shared.lock().engine.history().to_vec()
    }

    pub fn receipt(&self) -> Option<MeetingReceipt> {
        self.shared.lock().engine.receipt()
    }

    /// Read the engine under the lock.
    pub fn with_engine<R>(&self, f: impl FnOnce(&MeetingEngine) -> R) -> R {
        f(&self.shared.lock().engine)
    }

    pub fn is_ticking(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn start(&mut self, config: MeetingConfig) -> Result<Event> {
        self.transition(true, |engine| engine.start(config))
    }

    pub fn pause(&mut self) -> Result<Event> {
        self.transition(false, MeetingEngine::pause)
    }

    pub fn resume(&mut self) -> Result<Event> {
        self.transition(true, MeetingEngine::resume)
    }

    pub fn stop(&mut self) -> Result<Event> {
        self.transition(false, MeetingEngine::stop)
    }

    pub fn reset(&mut self) -> Event {
        let event = {
            let mut shared = self.shared.lock();
            shared.generation += 1;
            let event = shared.engine.reset();
            self.publish(event.clone());
            event
        };
        self.cancel_task();
        event
    }

    fn transition(
        &mut self,
        ticks_after: bool,
        op: impl FnOnce(&mut MeetingEngine) -> Result<Event>,
    ) -> Result<Event> {
        let runtime = if ticks_after {
            Some(Handle::try_current().map_err(|_| CoreError::NoRuntime)?)
        } else {
            None
        };

        // Publishing under the lock keeps lifecycle events ordered against
        // whatever the tick task sends.
        let (event, generation) = {
            let mut shared = self.shared.lock();
            let event = op(&mut shared.engine)?;
            shared.generation += 1;
            self.publish(event.clone());
            (event, shared.generation)
        };

        self.cancel_task();
        if let Some(runtime) = runtime {
            self.task = Some(runtime.spawn(run_ticks(
                Arc::clone(&self.shared),
                self.events.clone(),
                generation,
                self.tick_interval,
            )));
        }
        Ok(event)
    }

    fn cancel_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn publish(&self, event: Event) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl Drop for MeetingTimer {
    fn drop(&mut self) {
        self.shared.lock().generation += 1;
        self.cancel_task();
    }
}

async fn run_ticks(
    shared: Arc<Mutex<Shared>>,
    events: broadcast::Sender<Event>,
    generation: u64,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First tick completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;
        let mut guard = shared.lock();
        if guard.generation != generation {
            debug!(generation, current = guard.generation, "stale tick source exiting");
            return;
        }
        for event in guard.engine.tick() {
            let _ = events.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::meeting::{ManualClock, MeetingState};

    fn timer() -> (MeetingTimer, ManualClock) {
        let clock = ManualClock::new();
        let engine = MeetingEngine::with_clock(Arc::new(clock.clone()));
        (MeetingTimer::new(engine), clock)
    }

    fn cfg() -> MeetingConfig {
        MeetingConfig::new(5, 60.0, Currency::Usd)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_until_paused() {
        let (mut timer, clock) = timer();
        let mut rx = timer.subscribe();

        timer.start(cfg()).unwrap();
        assert!(timer.is_ticking());
        assert!(matches!(rx.recv().await.unwrap(), Event::MeetingStarted { .. }));

        clock.advance_ms(5_000);
        match rx.recv().await.unwrap() {
            Event::SampleRecorded { sample } => assert_eq!(sample.time, 5),
            other => panic!("expected sample, got {other:?}"),
        }
        assert_eq!(timer.snapshot().elapsed_seconds, 5);

        timer.pause().unwrap();
        assert!(!timer.is_ticking());
        assert!(matches!(rx.recv().await.unwrap(), Event::MeetingPaused { .. }));

        clock.advance_ms(60_000);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(timer.snapshot().elapsed_seconds, 5);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn resume_restarts_ticks() {
        let (mut timer, clock) = timer();
        timer.start(cfg()).unwrap();
        clock.advance_ms(2_000);
        tokio::time::sleep(Duration::from_millis(250)).await;
        timer.pause().unwrap();

        clock.advance_ms(30_000);
        timer.resume().unwrap();
        assert!(timer.is_ticking());
        clock.advance_ms(3_000);
        tokio::time::sleep(Duration::from_millis(250)).await;

        let snap = timer.snapshot();
        assert_eq!(snap.state, MeetingState::Active);
        assert_eq!(snap.elapsed_seconds, 5);
        let times: Vec<u64> = timer.history().iter().map(|s| s.time).collect();
        assert_eq!(times, vec![0, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_and_reset_cancel_ticks() {
        let (mut timer, clock) = timer();
        timer.start(cfg()).unwrap();
        clock.advance_ms(1_000);
        tokio::time::sleep(Duration::from_millis(250)).await;

        timer.stop().unwrap();
        assert!(!timer.is_ticking());
        assert!(timer.receipt().is_some());

        let event = timer.reset();
        assert!(matches!(event, Event::MeetingReset { .. }));
        clock.advance_ms(10_000);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(timer.snapshot().state, MeetingState::Idle);
        assert_eq!(timer.snapshot().elapsed_seconds, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_transition_keeps_existing_ticker() {
        let (mut timer, _clock) = timer();
        timer.start(cfg()).unwrap();
        assert!(timer.resume().is_err());
        assert!(timer.start(cfg()).is_err());
        assert!(timer.is_ticking());
    }

    #[test]
    fn start_outside_runtime_is_rejected() {
        let (mut timer, _clock) = timer();
        assert!(matches!(timer.start(cfg()), Err(CoreError::NoRuntime)));
        assert_eq!(timer.snapshot().state, MeetingState::Idle);
        // Non-ticking transitions still work without a runtime.
        assert!(timer.pause().is_err());
        timer.reset();
    }

    #[test]
    fn tick_interval_is_clamped() {
        let (timer, _clock) = timer();
        let timer = timer.with_tick_interval(Duration::ZERO);
        assert_eq!(timer.tick_interval(), Duration::from_millis(MIN_TICK_INTERVAL_MS));

        let timer = timer.with_tick_interval(Duration::from_secs(1));
        assert_eq!(timer.tick_interval(), Duration::from_millis(MAX_TICK_INTERVAL_MS));

        let timer = timer.with_tick_interval(Duration::from_millis(50));
        assert_eq!(timer.tick_interval(), Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_interval_still_samples_every_boundary() {
        let (timer, clock) = timer();
        let mut timer = timer.with_tick_interval(Duration::from_secs(30));
        timer.start(cfg()).unwrap();

        clock.advance_ms(5_000);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(timer.snapshot().elapsed_seconds, 5);
        assert_eq!(timer.history().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_ticks() {
        let (mut timer, clock) = timer();
        let mut rx = timer.subscribe();
        timer.start(cfg()).unwrap();
        let shared = Arc::clone(&timer.shared);

        drop(timer);
        clock.advance_ms(10_000);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(matches!(rx.recv().await.unwrap(), Event::MeetingStarted { .. }));
        // The aborted task held the last other sender.
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
        assert_eq!(Arc::strong_count(&shared), 1);
        assert_eq!(shared.lock().engine.elapsed_seconds(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn events_follow_lifecycle_order() {
        let (mut timer, clock) = timer();
        let mut rx = timer.subscribe();

        timer.start(cfg()).unwrap();
        clock.advance_ms(10_000);
        tokio::time::sleep(Duration::from_millis(150)).await;
        timer.pause().unwrap();
        timer.resume().unwrap();
        timer.stop().unwrap();
        timer.reset();

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(match event {
                Event::MeetingStarted { .. } => "started",
                Event::SampleRecorded { .. } => "sample",
                Event::EquivalenceReached { .. } => "milestone",
                Event::MeetingPaused { .. } => "paused",
                Event::MeetingResumed { .. } => "resumed",
                Event::MeetingStopped { .. } => "stopped",
                Event::MeetingReset { .. } => "reset",
            });
        }
        assert_eq!(
            kinds,
            ["started", "sample", "sample", "paused", "resumed", "stopped", "reset"]
        );
    }
}
