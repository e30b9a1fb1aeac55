//! Isolated worker task driving a [`TimerEngine`].
//!
//! The engine lives inside one tokio task and is reachable only through
//! messages: commands go in over an unbounded channel, ticks come out over
//! another, and status snapshots are published on a watch channel. Commands
//! are handled one at a time in arrival order.
//!
//! The periodic schedule is a `tokio::time::Interval` that mirrors the
//! engine's active [`ScheduleHandle`]. It is rebuilt whenever the handle
//! changes and dropped when the engine goes idle, so a superseded countdown
//! can never keep firing. Missed firings are skipped rather than burst.
//!
//! Dropping every [`TimerHandle`] lets a running countdown finish: the task
//! exits once the engine is idle, which closes the [`Ticks`] stream.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, trace};

use super::command::Command;
use super::engine::{ScheduleHandle, TimerEngine, TimerState, TimerStatus};
use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::events::Event;

/// Command entry point for a running worker. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<TimerStatus>,
}

/// The single listener for a worker's ticks.
#[derive(Debug)]
pub struct Ticks {
    events: mpsc::UnboundedReceiver<Event>,
}

/// A spawned worker.
#[derive(Debug)]
pub struct TimerWorker {
    pub handle: TimerHandle,
    pub ticks: Ticks,
    pub task: JoinHandle<()>,
}

/// Spawn `engine` onto the current tokio runtime.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn<C: Clock>(engine: TimerEngine<C>) -> TimerWorker {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(engine.status());

    let task = tokio::spawn(run(engine, command_rx, event_tx, status_tx));

    TimerWorker {
        handle: TimerHandle {
            commands: command_tx,
            status: status_rx,
        },
        ticks: Ticks { events: event_rx },
        task,
    }
}

impl TimerHandle {
    /// Queue a command.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::WorkerClosed`] if the worker has exited.
    pub fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| CoreError::WorkerClosed)
    }

    pub fn start(&self, seconds: f64) -> Result<()> {
        self.send(Command::Start { seconds })
    }

    pub fn stop(&self) -> Result<()> {
        self.send(Command::Stop)
    }

    pub fn set_end(&self, end_ms: i64) -> Result<()> {
        self.send(Command::SetEnd { end_ms })
    }

    /// Queue a raw JSON message. Malformed messages are logged and dropped.
    ///
    /// # Errors
    ///
    /// Only [`CoreError::WorkerClosed`]; decoding failures are not errors.
    pub fn post(&self, raw: &str) -> Result<()> {
        match Command::decode(raw) {
            Ok(command) => self.send(command),
            Err(e) => {
                debug!(error = %e, "dropping malformed message");
                if self.commands.is_closed() {
                    return Err(CoreError::WorkerClosed);
                }
                Ok(())
            }
        }
    }

    /// Latest published status.
    pub fn status(&self) -> TimerStatus {
        *self.status.borrow()
    }

    /// A receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<TimerStatus> {
        self.status.clone()
    }
}

impl Ticks {
    /// Next tick, or `None` once the worker has exited.
    pub async fn recv(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    /// A tick that is already queued, without waiting.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.events.try_recv().ok()
    }
}

async fn run<C: Clock>(
    mut engine: TimerEngine<C>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<Event>,
    status: watch::Sender<TimerStatus>,
) {
    let period = engine.config().tick_interval();
    let mut schedule: Option<(ScheduleHandle, Interval)> = None;
    let mut open = true;

    debug!(period_ms = engine.config().tick_interval_ms, "timer worker started");

    loop {
        if !open && engine.state() == TimerState::Idle {
            break;
        }

        tokio::select! {
            message = commands.recv(), if open => match message {
                Some(command) => {
                    trace!(?command, "command received");
                    if let Some(event) = engine.handle(command) {
                        emit(&events, event);
                    }
                }
                None => {
                    debug!("all handles dropped; draining");
                    open = false;
                }
            },
            handle = next_firing(&mut schedule) => {
                if let Some(event) = engine.on_schedule(handle) {
                    emit(&events, event);
                }
            }
        }

        sync_schedule(&engine, &mut schedule, period);
        status.send_if_modified(|current| {
            let next = engine.status();
            let changed = *current != next;
            *current = next;
            changed
        });
    }

    debug!("timer worker exited");
}

fn emit(events: &mpsc::UnboundedSender<Event>, event: Event) {
    if events.send(event).is_err() {
        trace!("tick listener gone");
    }
}

/// Resolves with the active handle each time its interval fires. Never
/// resolves while idle.
async fn next_firing(schedule: &mut Option<(ScheduleHandle, Interval)>) -> ScheduleHandle {
    match schedule {
        Some((handle, interval)) => {
            interval.tick().await;
            *handle
        }
        None => std::future::pending().await,
    }
}

/// Make the interval match the engine's active handle.
fn sync_schedule<C: Clock>(
    engine: &TimerEngine<C>,
    schedule: &mut Option<(ScheduleHandle, Interval)>,
    period: std::time::Duration,
) {
    let wanted = engine.active_schedule();
    if schedule.as_ref().map(|(handle, _)| *handle) == wanted {
        return;
    }
    *schedule = wanted.map(|handle| {
        // First firing is one period out; `start` already delivered a tick.
        let mut interval = time::interval_at(time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        (handle, interval)
    });
}
