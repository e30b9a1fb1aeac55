use chrono::Local;
use clap::Args;
use pomoflow_core::{spawn, Config, Event, TimerEngine, TimerState, TimerWorker};
use tracing::info;

#[derive(Args)]
pub struct CountdownArgs {
    /// Length of the countdown in seconds
    #[arg(allow_negative_numbers = true, value_parser = parse_seconds)]
    seconds: f64,
    /// Print ticks as protocol JSON instead of MM:SS
    #[arg(long)]
    json: bool,
}

fn parse_seconds(raw: &str) -> Result<f64, String> {
    let seconds: f64 = raw.parse().map_err(|_| format!("'{raw}' is not a number"))?;
    if !seconds.is_finite() {
        return Err(format!("'{raw}' is not a finite number"));
    }
    Ok(seconds)
}

pub fn run(config: &Config, args: CountdownArgs) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(countdown(config, args))
}

async fn countdown(config: &Config, args: CountdownArgs) -> Result<(), Box<dyn std::error::Error>> {
    let TimerWorker {
        handle,
        mut ticks,
        task,
    } = spawn(TimerEngine::new(config.timer));
    let mut status = handle.subscribe();
    let mut printer = TickPrinter::new(args.json);

    handle.start(args.seconds)?;
    if !args.json {
        let millis = ((args.seconds * 1000.0).round() as i64).max(-i64::MAX);
        if let Some(ends_at) =
            Local::now().checked_add_signed(chrono::Duration::milliseconds(millis))
        {
            println!("countdown ends at {}", ends_at.format("%H:%M:%S"));
        }
    }

    loop {
        tokio::select! {
            biased;
            event = ticks.recv() => match event {
                Some(event) => printer.print(event)?,
                None => break,
            },
            _ = status.wait_for(|s| s.starts > 0 && s.state == TimerState::Idle) => break,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted; stopping countdown");
                handle.stop()?;
                break;
            }
        }
    }

    drop(handle);
    task.await?;
    while let Some(event) = ticks.recv().await {
        printer.print(event)?;
    }
    Ok(())
}

struct TickPrinter {
    json: bool,
    last: Option<i64>,
}

impl TickPrinter {
    fn new(json: bool) -> Self {
        Self { json, last: None }
    }

    fn print(&mut self, event: Event) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string(&event)?);
            return Ok(());
        }
        // Two ticks per second usually round to the same value.
        let seconds = event.seconds();
        if self.last != Some(seconds) {
            println!("{}", format_remaining(seconds));
            self.last = Some(seconds);
        }
        Ok(())
    }
}

fn format_remaining(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let abs = seconds.unsigned_abs();
    format!("{sign}{:02}:{:02}", abs / 60, abs % 60)
}
