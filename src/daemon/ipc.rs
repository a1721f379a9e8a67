//! IPC server for the focus timer daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - One JSON request and one JSON response per connection
//! - Dispatch of requests to the timer, alert, tasks and settings

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::settings::{SettingsPatch, SettingsStore};
use crate::tasks::TaskStore;
use crate::types::{IpcRequest, IpcResponse, ResponseData, TimerSnapshot};

use super::timer::{CompletionAlert, TimerEngine};

// ============================================================================
// Constants
// ============================================================================

/// Maximum request size in bytes (4KB)
pub const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,

    /// The client closed the connection without sending anything
    #[error("Connection closed by client")]
    ConnectionClosed,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Reads one request, up to end of input or [`MAX_REQUEST_SIZE`] bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if reading times out, the request is too large or
    /// empty, or it is not a valid request.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = Vec::with_capacity(512);
        let limit = MAX_REQUEST_SIZE as u64 + 1;

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            (&mut *stream).take(limit).read_to_end(&mut buffer),
        )
        .await;

        match read_result {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        }

        if buffer.is_empty() {
            return Err(IpcError::ConnectionClosed.into());
        }
        if buffer.len() > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest =
            serde_json::from_slice(&buffer).context("Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;
        stream.shutdown().await.context("Failed to close response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Daemon-owned state outside the countdown.
#[derive(Debug)]
pub struct DaemonState {
    pub tasks: TaskStore,
    pub settings: SettingsStore,
}

impl DaemonState {
    pub fn new(settings: SettingsStore) -> Self {
        Self {
            tasks: TaskStore::new(),
            settings,
        }
    }
}

/// Handles IPC requests.
pub struct RequestHandler {
    engine: TimerEngine,
    alert: Arc<dyn CompletionAlert>,
    state: Arc<Mutex<DaemonState>>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(
        engine: TimerEngine,
        alert: Arc<dyn CompletionAlert>,
        state: Arc<Mutex<DaemonState>>,
    ) -> Self {
        Self {
            engine,
            alert,
            state,
        }
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        debug!("Handling request: {:?}", request);
        match request {
            IpcRequest::Start { minutes } => self.handle_start(minutes),
            IpcRequest::TogglePause => self.handle_toggle_pause(),
            IpcRequest::Reset => {
                self.engine.reset();
                IpcResponse::success("Countdown reset", Some(self.timer_data()))
            }
            IpcRequest::Stop => {
                self.engine.stop();
                IpcResponse::success("Countdown stopped", Some(self.timer_data()))
            }
            IpcRequest::Status => IpcResponse::success("", Some(self.timer_data())),
            IpcRequest::Dismiss => self.handle_dismiss(),
            IpcRequest::AddTask { text } => {
                self.mutate_tasks("Task added", |tasks| tasks.add(&text).map(drop))
                    .await
            }
            IpcRequest::ToggleTask { id } => {
                self.mutate_tasks("Task updated", |tasks| tasks.toggle(id).map(drop))
                    .await
            }
            IpcRequest::DeleteTask { id } => {
                self.mutate_tasks("Task deleted", |tasks| tasks.delete(id).map(drop))
                    .await
            }
            IpcRequest::ListTasks => {
                let state = self.state.lock().await;
                IpcResponse::success("", Some(ResponseData::from_tasks(state.tasks.list().to_vec())))
            }
            IpcRequest::GetSettings => {
                let state = self.state.lock().await;
                IpcResponse::success("", Some(ResponseData::from_settings(state.settings.get())))
            }
            IpcRequest::UpdateSettings { patch } => self.handle_update_settings(patch).await,
            IpcRequest::ResetSettings => {
                let state = self.state.lock().await;
                let settings = state.settings.reset();
                IpcResponse::success(
                    "Settings restored to defaults",
                    Some(ResponseData::from_settings(settings)),
                )
            }
        }
    }

    fn timer_data(&self) -> ResponseData {
        ResponseData {
            timer: Some(TimerSnapshot::from(&self.engine.snapshot())),
            alerting: Some(self.alert.is_active()),
            ..ResponseData::default()
        }
    }

    fn handle_start(&self, minutes: i64) -> IpcResponse {
        if minutes <= 0 {
            return IpcResponse::error("Enter a valid time");
        }
        if self.engine.snapshot().is_running() {
            return IpcResponse::error("A countdown is already running");
        }
        if !self.engine.start(minutes) {
            return IpcResponse::error("Enter a valid time");
        }
        IpcResponse::success("Countdown started", Some(self.timer_data()))
    }

    fn handle_toggle_pause(&self) -> IpcResponse {
        if !self.engine.toggle_pause() {
            return IpcResponse::error("No countdown to pause or resume");
        }
        let message = if self.engine.snapshot().is_running() {
            "Countdown resumed"
        } else {
            "Countdown paused"
        };
        IpcResponse::success(message, Some(self.timer_data()))
    }

    fn handle_dismiss(&self) -> IpcResponse {
        if !self.alert.is_active() {
            return IpcResponse::success("No alert is ringing", Some(self.timer_data()));
        }
        self.alert.dismiss();
        IpcResponse::success("Alert dismissed", Some(self.timer_data()))
    }

    async fn mutate_tasks<F>(&self, message: &str, mutate: F) -> IpcResponse
    where
        F: FnOnce(&mut TaskStore) -> Result<(), crate::tasks::TaskError>,
    {
        if self.engine.snapshot().is_running() {
            return IpcResponse::error("Tasks are locked while a countdown is running");
        }
        let mut state = self.state.lock().await;
        match mutate(&mut state.tasks) {
            Ok(()) => IpcResponse::success(
                message,
                Some(ResponseData::from_tasks(state.tasks.list().to_vec())),
            ),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    async fn handle_update_settings(&self, patch: SettingsPatch) -> IpcResponse {
        let state = self.state.lock().await;
        match state.settings.update(patch) {
            Ok(settings) => {
                IpcResponse::success("Settings updated", Some(ResponseData::from_settings(settings)))
            }
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }
}

/// Serves one connection: reads a request, answers it, closes.
///
/// # Errors
///
/// Returns an error if the request cannot be read or the response cannot be
/// written. Malformed requests still receive an error response.
pub async fn handle_connection(mut stream: UnixStream, handler: &RequestHandler) -> Result<()> {
    let response = match IpcServer::receive_request(&mut stream).await {
        Ok(request) => handler.handle(request).await,
        Err(e) => {
            if matches!(
                e.downcast_ref::<IpcError>(),
                Some(IpcError::ConnectionClosed | IpcError::Timeout)
            ) {
                return Err(e);
            }
            IpcResponse::error(format!("Invalid request: {e:#}"))
        }
    };
    IpcServer::send_response(&mut stream, &response).await
}

// ============================================================================
// Tests
// ============================================================================
