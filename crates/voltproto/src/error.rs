//! Typed bridge errors and the caller-facing envelope.
//!
//! Validation errors never reach the network; relay errors carry the
//! underlying system message where one exists. All of them are terminal
//! for the current request - nothing is retried.

use serde_json::{json, Value};
use thiserror::Error;

/// Everything that can go wrong between the caller and the controller.
///
/// Display strings are the exact messages surfaced to the browser, so
/// changing one is a caller-visible protocol change.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    /// Request body did not parse as JSON.
    #[error("Invalid JSON data received")]
    InvalidPayload,

    /// `update_sequence` without channel, cv_values, or gate_states.
    #[error("Missing required sequence data")]
    MissingField,

    /// A CV element was non-numeric or outside [0, 1].
    #[error("Invalid CV value. Must be between 0 and 1")]
    InvalidCv,

    /// A gate element was anything other than integer 0 or 1.
    #[error("Invalid gate state. Must be 0 or 1")]
    InvalidGate,

    /// Tempo outside [40, 300] BPM.
    #[error("Tempo must be between 40 and 300 BPM")]
    InvalidTempo,

    /// GET with no recognized query parameter.
    #[error("No command received")]
    NoCommand,

    /// HTTP method the bridge does not serve.
    #[error("Unsupported request method")]
    UnsupportedMethod,

    /// Socket setup / address resolution failure before connect.
    #[error("Socket creation failed: {0}")]
    Socket(String),

    /// TCP connect refused or timed out.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Read failed or timed out (or the send before it broke the stream).
    #[error("Failed to read response")]
    Read,
}

impl BridgeError {
    /// The only shape a bridge-local failure is allowed to take.
    pub fn to_envelope(&self) -> Value {
        json!({ "status": "error", "message": self.to_string() })
    }
}
