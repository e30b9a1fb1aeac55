//! Timer engine implementation.
//!
//! The timer engine is a clock-driven state machine. It owns the absolute end
//! time of the countdown and recomputes the remaining seconds from the clock on
//! every tick, so late or skipped firings never distort what it reports.
//!
//! It does not own a timer primitive. Starting a countdown issues a
//! [`ScheduleHandle`]; whoever drives the engine (see [`super::worker`]) fires
//! that handle periodically through [`TimerEngine::on_schedule`]. A firing that
//! carries a retired handle is ignored.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running              start
//! Running -> Running           start (previous schedule retired)
//! Running -> Idle              stop | overrun | negative remaining
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerConfig::default());
//! let first = engine.handle(Command::Start { seconds: 1500.0 });
//! // Every `config.tick_interval()`:
//! if let Some(handle) = engine.active_schedule() {
//!     engine.on_schedule(handle);
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::command::Command;
use crate::clock::{Clock, SystemClock};
use crate::config::TimerConfig;
use crate::events::{Event, IDLE_SENTINEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
}

/// Token for one periodic schedule. Each `start` issues a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleHandle(u64);

impl ScheduleHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Point-in-time view of the engine, published to hosts on change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerStatus {
    pub state: TimerState,
    pub end_ms: Option<i64>,
    /// Number of accepted `start` commands.
    pub starts: u64,
}

/// Core countdown engine.
#[derive(Debug)]
pub struct TimerEngine<C: Clock = SystemClock> {
    clock: C,
    config: TimerConfig,
    /// Absolute end of the countdown, epoch milliseconds.
    end_ms: Option<i64>,
    /// Present iff Running.
    schedule: Option<ScheduleHandle>,
    next_schedule_id: u64,
    starts: u64,
}

impl TimerEngine<SystemClock> {
    /// Create an idle engine reading the wall clock.
    pub fn new(config: TimerConfig) -> Self {
        Self::with_clock(SystemClock, config)
    }
}

impl<C: Clock> TimerEngine<C> {
    /// Create an idle engine reading the given clock.
    pub fn with_clock(clock: C, config: TimerConfig) -> Self {
        Self {
            clock,
            config,
            end_ms: None,
            schedule: None,
            next_schedule_id: 0,
            starts: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        if self.schedule.is_some() {
            TimerState::Running
        } else {
            TimerState::Idle
        }
    }

    pub fn end_ms(&self) -> Option<i64> {
        self.end_ms
    }

    pub fn active_schedule(&self) -> Option<ScheduleHandle> {
        self.schedule
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn status(&self) -> TimerStatus {
        TimerStatus {
            state: self.state(),
            end_ms: self.end_ms,
            starts: self.starts,
        }
    }

    /// Seconds left right now, or [`IDLE_SENTINEL`] when no end time is set.
    /// Does not touch the schedule.
    pub fn remaining_seconds(&self) -> i64 {
        match self.end_ms {
            Some(end) => seconds_left(end, self.clock.now_ms()),
            None => IDLE_SENTINEL,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply one command. Returns the tick to deliver, if any.
    ///
    /// Only `start` produces a tick; it must reach the host before anything
    /// else the engine emits.
    pub fn handle(&mut self, command: Command) -> Option<Event> {
        match command {
            Command::Start { seconds } => Some(self.start(seconds)),
            Command::Stop => {
                self.stop();
                None
            }
            Command::SetEnd { end_ms } => {
                self.set_end(end_ms);
                None
            }
        }
    }

    /// Begin a countdown of `seconds`. Zero and negative values are accepted
    /// and end on a following firing.
    pub fn start(&mut self, seconds: f64) -> Event {
        if let Some(previous) = self.schedule.take() {
            debug!(schedule = previous.id(), "superseding running countdown");
        }
        let now = self.clock.now_ms();
        let end = now.saturating_add(secs_to_ms(seconds));
        self.end_ms = Some(end);
        self.starts += 1;

        let first = self.tick_at(now);

        let handle = ScheduleHandle(self.next_schedule_id);
        self.next_schedule_id += 1;
        self.schedule = Some(handle);
        debug!(
            schedule = handle.id(),
            seconds,
            end_ms = end,
            "countdown started"
        );
        first
    }

    /// Cancel the countdown and clear the end time. No-op when idle.
    pub fn stop(&mut self) {
        if let Some(handle) = self.schedule.take() {
            debug!(schedule = handle.id(), "countdown stopped");
        }
        self.end_ms = None;
    }

    /// Replace the reference end time. State and schedule are untouched.
    pub fn set_end(&mut self, end_ms: i64) {
        debug!(end_ms, previous = ?self.end_ms, "end time replaced");
        self.end_ms = Some(end_ms);
    }

    /// A periodic firing of `handle`.
    ///
    /// Returns `None` for a retired handle. Otherwise emits a tick, then
    /// self-terminates when the countdown is over by more than the grace
    /// window.
    pub fn on_schedule(&mut self, handle: ScheduleHandle) -> Option<Event> {
        if self.schedule != Some(handle) {
            trace!(schedule = handle.id(), "ignoring retired schedule");
            return None;
        }
        let now = self.clock.now_ms();
        let tick = self.tick_at(now);

        if self.schedule.is_some() {
            let grace = i64::try_from(self.config.overrun_grace_ms).unwrap_or(i64::MAX);
            let overrun = match self.end_ms {
                Some(end) => now > end.saturating_add(grace),
                None => true,
            };
            if overrun {
                self.cancel_schedule("overrun");
            }
        }
        Some(tick)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn tick_at(&mut self, now: i64) -> Event {
        let Some(end) = self.end_ms else {
            return Event::idle();
        };
        let seconds = seconds_left(end, now);
        trace!(seconds, "tick");
        if seconds < 0 && self.config.stop_on_negative && self.schedule.is_some() {
            self.cancel_schedule("negative remaining");
        }
        Event::tick(seconds)
    }

    fn cancel_schedule(&mut self, reason: &'static str) {
        if let Some(handle) = self.schedule.take() {
            debug!(schedule = handle.id(), reason, "countdown self-terminated");
        }
    }
}

/// `round((end - now) / 1000)` with ties toward positive infinity.
fn seconds_left(end_ms: i64, now_ms: i64) -> i64 {
    end_ms
        .saturating_sub(now_ms)
        .saturating_add(500)
        .div_euclid(1000)
}

fn secs_to_ms(seconds: f64) -> i64 {
    // `as` saturates and maps NaN to zero.
    (seconds * 1000.0).round() as i64
}
