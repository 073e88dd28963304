//! CLI command implementations

use std::time::Duration;

use anyhow::{Context, Result};

use voltgate::relay::RelayClient;

/// Send a raw JSON document to the controller and print the reply.
///
/// The argument is parsed only to catch typos before opening a
/// connection; what goes on the wire is the compact re-encoding, and
/// what comes back is printed as-is.
pub async fn send(endpoint: &str, json: &str, timeout_ms: u64) -> Result<()> {
    let value: serde_json::Value =
        serde_json::from_str(json).context("Failed to parse JSON command")?;

    let client = RelayClient::new(endpoint, Duration::from_millis(timeout_ms));
    let reply = client.send_raw(value.to_string().as_bytes()).await?;

    println!("{}", String::from_utf8_lossy(&reply));
    Ok(())
}
