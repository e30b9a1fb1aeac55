//! # Pomoflow Core Library
//!
//! Drift-corrected countdown engine for the Pomoflow Pomodoro timer. A host
//! (UI, CLI, anything that can pass messages) sends `start`/`stop`/`setEnd`
//! commands and receives `tick` events carrying the seconds left.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a clock-driven state machine that stores the absolute
//!   end time and recomputes remaining seconds on every tick, so a throttled
//!   or suspended host never accumulates drift
//! - **Worker**: a tokio task that owns one engine and its periodic schedule,
//!   reachable only through channels
//! - **Clock**: wall, monotonic and manual time sources
//! - **Config**: TOML-based tuning of cadence and overrun policy
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core countdown state machine
//! - [`spawn`]: Run an engine in its own task
//! - [`Command`] / [`Event`]: The message protocol
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod timer;

pub use clock::{Clock, ManualClock, MonotonicClock, SystemClock};
pub use config::{Config, LoggingConfig, TimerConfig, MAX_TICK_INTERVAL_MS};
pub use error::{ConfigError, CoreError, ProtocolError, ValidationError};
pub use events::{Event, IDLE_SENTINEL};
pub use timer::{
    spawn, Command, ScheduleHandle, Ticks, TimerEngine, TimerHandle, TimerState, TimerStatus,
    TimerWorker,
};
