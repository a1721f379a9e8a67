//! Daemon module for the focus timer.
//!
//! This module contains the core daemon functionality:
//! - `scheduler`: Cancellable repeating callbacks
//! - `timer`: Countdown engine
//! - `alert`: Completion alert sequencing (sound repeats + notification)
//! - `ipc`: Unix socket server and request dispatch
//!
//! [`run`] wires them together with the settings store, the task list and
//! the ambient sound player, and serves clients until a shutdown signal.

pub mod alert;
pub mod ipc;
pub mod scheduler;
pub mod timer;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

pub use alert::{AlertConfig, AlertSequencer};
pub use ipc::{handle_connection, DaemonState, IpcServer, RequestHandler};
pub use scheduler::{Repeat, Scheduler, TimerHandle};
pub use timer::{CompletionAlert, TimerEngine, TimerEvent};

use crate::notification::DesktopNotifier;
use crate::settings::{AppSettings, SettingsStore};
use crate::sound::{alert_sound, player_or_silent, AmbientPlayer};

/// Daemon startup options.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub socket_path: PathBuf,
    /// Settings file; `None` keeps settings in memory only
    pub settings_path: Option<PathBuf>,
    /// Directory holding the alert and ambient sound files
    pub sounds_dir: Option<PathBuf>,
    /// Skip audio device initialization
    pub mute: bool,
    /// Show desktop notifications on completion
    pub notifications: bool,
}

/// Runs the daemon until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the socket cannot be bound.
pub async fn run(config: DaemonConfig) -> Result<()> {
    let settings = match &config.settings_path {
        Some(path) => SettingsStore::load(path),
        None => SettingsStore::in_memory(AppSettings::default()),
    };
    if let Some(path) = settings.path() {
        info!("Settings: {}", path.display());
    }

    let scheduler = Scheduler::current();
    let player = player_or_silent(config.mute);
    let alert_config = AlertConfig::default();
    let notifier = Arc::new(DesktopNotifier::new(
        config.notifications,
        alert_config.window(),
    ));
    let sound = alert_sound(config.sounds_dir.as_deref());
    debug!("Alert sound: {:?}", sound);

    let alert = Arc::new(AlertSequencer::new(
        player.clone(),
        notifier,
        sound,
        alert_config,
        settings.subscribe(),
        scheduler.clone(),
    ));

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let engine = TimerEngine::new(alert.clone(), event_tx, scheduler.clone());
    tokio::spawn(log_events(event_rx));

    let shutdown = CancellationToken::new();
    let ambient = AmbientPlayer::new(player, config.sounds_dir.clone().unwrap_or_default());
    let ambient_task = tokio::spawn(ambient.run(settings.subscribe(), shutdown.clone()));

    let state = Arc::new(Mutex::new(DaemonState::new(settings)));
    let handler = Arc::new(RequestHandler::new(engine.clone(), alert.clone(), state));

    let server = IpcServer::new(&config.socket_path)?;
    info!("Daemon listening on {}", server.socket_path().display());

    let signal = shutdown_signal();
    tokio::pin!(signal);

    loop {
        tokio::select! {
            _ = &mut signal => {
                info!("Shutdown signal received");
                break;
            }
            accepted = server.accept() => match accepted {
                Ok(stream) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &handler).await {
                            debug!("Connection error: {:#}", e);
                        }
                    });
                }
                Err(e) => warn!("Failed to accept connection: {:#}", e),
            },
        }
    }

    engine.stop();
    alert.dismiss();
    shutdown.cancel();
    if let Err(e) = ambient_task.await {
        warn!("Ambient player task failed: {}", e);
    }
    info!("Daemon stopped");
    Ok(())
}

async fn log_events(mut events: mpsc::UnboundedReceiver<TimerEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            TimerEvent::Tick { remaining_seconds } => trace!("Tick: {}s left", remaining_seconds),
            TimerEvent::Finished => info!("Time's up"),
            other => debug!("Timer event: {:?}", other),
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
                return;
            }
            Err(e) => warn!("Cannot listen for SIGTERM: {}", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
