//! Run command implementation.
//!
//! Drives the fabrication loop continuously against the demo library until
//! interrupted or until an optional duration elapses.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use log::info;
use tokio::sync::watch;

use chainwave_work::WorkSchedule;

use super::{demo_manager, load_config};

/// Run the run command.
///
/// # Arguments
/// * `config_path` - Optional engine config JSON file
/// * `tick_ms` - Milliseconds between scheduler ticks
/// * `duration_secs` - Optional wall-clock runtime; runs until Ctrl-C when absent
///
/// # Returns
/// Exit code: 0 on clean shutdown, 1 when the work loop aborted
pub fn run(
    config_path: Option<&str>,
    tick_ms: u64,
    duration_secs: Option<u64>,
) -> Result<ExitCode> {
    let config = load_config(config_path)?;
    let schedule = WorkSchedule {
        tick: Duration::from_millis(tick_ms),
        ..Default::default()
    };
    let (_store, manager) = demo_manager(config, schedule)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async move {
        let (tx, rx) = watch::channel(false);
        let loop_task = tokio::spawn(async move { manager.run(rx).await });

        match duration_secs {
            Some(seconds) => {
                tokio::time::sleep(Duration::from_secs(seconds)).await;
                info!("runtime of {seconds}s elapsed");
            }
            None => {
                tokio::signal::ctrl_c()
                    .await
                    .context("failed to listen for Ctrl-C")?;
                info!("interrupt received");
            }
        }
        let _ = tx.send(true);

        match loop_task.await.context("work loop panicked")? {
            Ok(()) => Ok(ExitCode::SUCCESS),
            Err(err) => {
                eprintln!("{}: {err}", "work loop aborted".red().bold());
                Ok(ExitCode::from(1))
            }
        }
    })
}
