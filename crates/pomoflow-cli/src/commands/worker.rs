//! `pomoflow-cli worker`: the timer protocol over stdio.
//!
//! Each stdin line is one command message; each stdout line is one tick.
//! Lines that are not UTF-8 or not a valid command are dropped.
//! At end of input a running countdown is allowed to finish before exiting.

use pomoflow_core::{spawn, Config, CoreError, TimerEngine, TimerWorker};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

pub fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(serve(config))
}

async fn serve(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let TimerWorker {
        handle,
        mut ticks,
        task,
    } = spawn(TimerEngine::new(config.timer));

    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).split(b'\n');
        while let Some(bytes) = lines.next_segment().await? {
            let Ok(line) = std::str::from_utf8(&bytes) else {
                debug!(len = bytes.len(), "dropping message that is not UTF-8");
                continue;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Err(e) = handle.post(line) {
                debug!(error = %e, "ignoring remaining input");
                break;
            }
        }
        debug!("stdin closed");
        Ok::<(), CoreError>(())
    });

    let mut stdout = tokio::io::stdout();
    while let Some(event) = ticks.recv().await {
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');
        stdout.write_all(line.as_bytes()).await?;
        stdout.flush().await?;
    }

    task.await?;
    reader.await??;
    Ok(())
}
