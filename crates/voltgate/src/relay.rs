//! One-shot TCP relay to the sequencer controller.
//!
//! One connection per command: connect, write a single JSON document
//! with no framing, read once, close. The controller replies with one
//! JSON object per connection; there is no handshake, no reuse, and no
//! retry.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;
use voltproto::{BridgeError, Command};

/// Upper bound on a single controller reply. The relay performs exactly
/// one read; anything past this is truncated rather than drained, so a
/// controller that keeps the connection open cannot hang the bridge.
pub const READ_BUF_SIZE: usize = 2048;

/// Default controller endpoint.
pub const DEFAULT_ENDPOINT: &str = "localhost:5000";

/// Default bound applied independently to connect, send, and receive.
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Short-lived client for the sequencer controller.
#[derive(Debug, Clone)]
pub struct RelayClient {
    endpoint: String,
    timeout: Duration,
}

impl RelayClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Deliver one command and return the controller's raw reply.
    ///
    /// The reply bytes pass through unparsed - the controller is trusted
    /// to produce JSON, and the bridge never inspects it. An empty read
    /// (controller closed without writing) passes through as an empty
    /// body too.
    pub async fn send(&self, command: &Command) -> Result<Vec<u8>, BridgeError> {
        debug!(tag = command.tag(), endpoint = %self.endpoint, "relaying command");
        self.send_raw(command.to_wire().to_string().as_bytes())
            .await
    }

    /// Deliver pre-encoded JSON bytes. Escape hatch for the CLI `send`
    /// command; the HTTP surface always goes through [`Self::send`].
    pub async fn send_raw(&self, wire: &[u8]) -> Result<Vec<u8>, BridgeError> {
        let mut stream = self.connect().await?;

        // Send errors surface on the read that follows them, same as the
        // caller would observe against a controller that dropped us.
        match timeout(self.timeout, stream.write_all(wire)).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) | Err(_) => return Err(BridgeError::Read),
        }

        let mut buf = vec![0u8; READ_BUF_SIZE];
        let n = match timeout(self.timeout, stream.read(&mut buf)).await {
            Ok(Ok(n)) => n,
            Ok(Err(_)) | Err(_) => return Err(BridgeError::Read),
        };
        buf.truncate(n);

        // Stream drops here: the connection closes after the single read
        // regardless of what the controller does next.
        Ok(buf)
    }

    async fn connect(&self) -> Result<TcpStream, BridgeError> {
        // Resolution failure is a socket-setup error, distinct from a
        // refused or timed-out connect.
        let mut addrs = tokio::net::lookup_host(self.endpoint.as_str())
            .await
            .map_err(|e| BridgeError::Socket(e.to_string()))?;
        let addr = addrs
            .next()
            .ok_or_else(|| BridgeError::Socket(format!("no address for {}", self.endpoint)))?;

        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(BridgeError::Connection(e.to_string())),
            Err(_) => Err(BridgeError::Connection("timed out".to_string())),
        }
    }
}
