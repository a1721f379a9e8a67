//! CLI module for uibo.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `client`: IPC client for daemon communication
//! - `display`: Output formatting and display logic
//!
//! plus the two interactive pieces: the stop confirmation prompt and the
//! `status --watch` polling loop.

pub mod client;
pub mod commands;
pub mod display;

use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::MissedTickBehavior;

pub use client::IpcClient;
pub use commands::{
    Cli, Commands, DaemonArgs, SettingsCommand, SettingsSetArgs, StartArgs, TaskCommand,
};
pub use display::Display;

use crate::types::IpcResponse;

/// Poll period of `status --watch`.
pub const WATCH_INTERVAL: Duration = Duration::from_secs(1);

/// Turns an `error` response into an `Err` carrying the daemon's message.
pub fn ensure_success(response: IpcResponse) -> Result<IpcResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        anyhow::bail!("{}", response.message)
    }
}

/// Asks a yes/no question on stdin. Anything but `y`/`yes` is a no.
pub fn confirm(question: &str) -> Result<bool> {
    let stdin = std::io::stdin();
    confirm_with(stdin.lock(), std::io::stderr(), question)
}

fn confirm_with(mut input: impl BufRead, mut output: impl Write, question: &str) -> Result<bool> {
    write!(output, "{question} [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read the answer")?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Returns true when `stop` should ask first: `confirmOnStop` is set and
/// there is a countdown to lose.
pub async fn should_confirm_stop(client: &IpcClient) -> Result<bool> {
    let settings = ensure_success(client.get_settings().await?)?
        .data
        .and_then(|d| d.settings)
        .context("The daemon did not return settings")?;
    if !settings.confirm_on_stop {
        return Ok(false);
    }

    let status = ensure_success(client.status().await?)?;
    Ok(status
        .data
        .and_then(|d| d.timer)
        .is_some_and(|t| t.initial_seconds > 0))
}

/// Redraws the countdown once per second until Ctrl-C.
pub async fn watch_status(client: &IpcClient) -> Result<()> {
    let mut interval = tokio::time::interval(WATCH_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = interval.tick() => {
                let response = ensure_success(client.status().await?)?;
                let data = response.data.unwrap_or_default();
                if let Some(timer) = &data.timer {
                    Display::show_watch_line(timer, data.alerting == Some(true));
                }
            }
        }
    }
    println!();
    Ok(())
}
