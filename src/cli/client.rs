//! IPC client for communicating with the uibo daemon.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic
//! - Timeout handling

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;
use uuid::Uuid;

use crate::paths::default_socket_path;
use crate::settings::SettingsPatch;
use crate::types::{IpcRequest, IpcResponse};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (64KB)
const MAX_RESPONSE_SIZE: u64 = 65536;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds (base delay, multiplied by attempt number)
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for daemon communication.
///
/// Every method returns the daemon's response as-is; an `error` status is
/// not turned into an `Err`. Only transport failures are retried.
#[derive(Debug, Clone)]
pub struct IpcClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl Default for IpcClient {
    fn default() -> Self {
        Self::with_socket_path(default_socket_path())
    }
}

impl IpcClient {
    /// Creates a client for the default socket path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a client for a custom socket path.
    pub fn with_socket_path(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub async fn start(&self, minutes: u32) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Start {
            minutes: i64::from(minutes),
        })
        .await
    }

    pub async fn toggle_pause(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::TogglePause).await
    }

    pub async fn reset(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Reset).await
    }

    pub async fn stop(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Stop).await
    }

    pub async fn status(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Status).await
    }

    pub async fn dismiss(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Dismiss).await
    }

    pub async fn add_task(&self, text: impl Into<String>) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::AddTask { text: text.into() })
            .await
    }

    pub async fn toggle_task(&self, id: Uuid) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::ToggleTask { id })
            .await
    }

    pub async fn delete_task(&self, id: Uuid) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::DeleteTask { id })
            .await
    }

    pub async fn list_tasks(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::ListTasks).await
    }

    pub async fn get_settings(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::GetSettings).await
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::UpdateSettings { patch })
            .await
    }

    pub async fn reset_settings(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::ResetSettings)
            .await
    }

    /// Sends a request to the daemon with retry logic.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut attempt = 1;
        loop {
            match self.send_request(request).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < MAX_RETRIES => {
                    tracing::warn!("Request failed (attempt {}/{}): {:#}", attempt, MAX_RETRIES, e);
                    let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Sends a single request to the daemon.
    async fn send_request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let io_timeout = Duration::from_secs(IO_TIMEOUT_SECS);

        let mut stream = timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("Connection timed out")?
            .with_context(|| {
                format!(
                    "Cannot connect to the daemon at {}. Start it with 'uibo daemon'",
                    self.socket_path.display()
                )
            })?;

        let request_json = serde_json::to_vec(request).context("Failed to serialize request")?;

        timeout(io_timeout, stream.write_all(&request_json))
            .await
            .context("Write timed out")?
            .context("Failed to send request")?;

        timeout(io_timeout, stream.flush())
            .await
            .context("Flush timed out")?
            .context("Failed to flush request")?;

        // The daemon reads until EOF
        stream
            .shutdown()
            .await
            .context("Failed to shut down the write side")?;

        let mut buffer = Vec::new();
        timeout(
            io_timeout,
            (&mut stream).take(MAX_RESPONSE_SIZE).read_to_end(&mut buffer),
        )
        .await
        .context("Read timed out")?
        .context("Failed to receive response")?;

        if buffer.is_empty() {
            anyhow::bail!("The daemon sent no response");
        }

        serde_json::from_slice(&buffer).context("Failed to parse response")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CountdownState, ResponseData};
    use tokio::net::UnixListener;

    // ------------------------------------------------------------------------
    // Helper functions
    // ------------------------------------------------------------------------

    /// Serves one connection: returns the decoded request and answers with
    /// `response`.
    async fn serve_once(listener: UnixListener, response: IpcResponse) -> IpcRequest {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer).await.unwrap();
        let request: IpcRequest = serde_json::from_slice(&buffer).unwrap();

        let json = serde_json::to_vec(&response).unwrap();
        stream.write_all(&json).await.unwrap();
        stream.shutdown().await.unwrap();
        request
    }

    // ------------------------------------------------------------------------
    // IpcClient Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_with_socket_path() {
        let client = IpcClient::with_socket_path("/tmp/test.sock");
        assert_eq!(client.socket_path(), Path::new("/tmp/test.sock"));
    }

    #[test]
    fn test_default_socket_path() {
        assert!(IpcClient::new().socket_path().ends_with(".uibo/uibo.sock"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connection_failure_after_retries() {
        let dir = tempfile::tempdir().unwrap();
        let client = IpcClient::with_socket_path(dir.path().join("missing.sock"));

        let err = client.status().await.unwrap_err();
        assert!(format!("{err:#}").contains("uibo daemon"));
    }

    #[tokio::test]
    async fn test_send_status_request() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");
        let listener = UnixListener::bind(&socket_path).unwrap();

        let mut state = CountdownState::new();
        state.start(90);
        let server = tokio::spawn(serve_once(
            listener,
            IpcResponse::success("", Some(ResponseData::from_countdown(&state))),
        ));

        let client = IpcClient::with_socket_path(&socket_path);
        let response = client.status().await.unwrap();

        assert!(response.is_success());
        let timer = response.data.unwrap().timer.unwrap();
        assert_eq!(timer.remaining_seconds, 90);
        assert!(matches!(server.await.unwrap(), IpcRequest::Status));
    }

    #[tokio::test]
    async fn test_send_start_request() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");
        let listener = UnixListener::bind(&socket_path).unwrap();

        let server = tokio::spawn(serve_once(listener, IpcResponse::success("Started", None)));

        let client = IpcClient::with_socket_path(&socket_path);
        client.start(45).await.unwrap();

        assert!(matches!(
            server.await.unwrap(),
            IpcRequest::Start { minutes: 45 }
        ));
    }

    #[tokio::test]
    async fn test_error_response_is_returned_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");
        let listener = UnixListener::bind(&socket_path).unwrap();

        let server = tokio::spawn(serve_once(
            listener,
            IpcResponse::error("No alert is ringing"),
        ));

        let client = IpcClient::with_socket_path(&socket_path);
        let response = client.dismiss().await.unwrap();

        assert!(!response.is_success());
        assert_eq!(response.message, "No alert is ringing");
        assert!(matches!(server.await.unwrap(), IpcRequest::Dismiss));
    }

    #[tokio::test]
    async fn test_empty_response_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");
        let listener = UnixListener::bind(&socket_path).unwrap();

        // Answer every attempt with nothing
        tokio::spawn(async move {
            loop {
                let (mut stream, _) = listener.accept().await.unwrap();
                let mut buffer = Vec::new();
                let _ = stream.read_to_end(&mut buffer).await;
            }
        });

        let client = IpcClient::with_socket_path(&socket_path);
        let err = client.list_tasks().await.unwrap_err();
        assert!(err.to_string().contains("no response"));
    }
}
