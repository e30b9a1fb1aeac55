mod command;
mod engine;
pub mod worker;

pub use command::Command;
pub use engine::{ScheduleHandle, TimerEngine, TimerState, TimerStatus};
pub use worker::{spawn, Ticks, TimerHandle, TimerWorker};
