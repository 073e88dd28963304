//! End-to-end HTTP tests: real router, real sockets, mock controller

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use voltgate::relay::RelayClient;
use voltgate::serve::{router, BridgeState};

/// Serve the bridge router on an ephemeral port, pointed at `sequencer`.
async fn spawn_bridge(sequencer: String) -> String {
    let state = BridgeState {
        relay: RelayClient::new(sequencer, Duration::from_millis(500)),
        start_time: Instant::now(),
    };
    let app = router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// One-shot mock controller that records what it received.
async fn mock_controller(reply: Vec<u8>) -> (SocketAddr, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let n = stream.read(&mut buf).await.unwrap();
        buf.truncate(n);
        stream.write_all(&reply).await.unwrap();
        buf
    });
    (addr, handle)
}

/// A listener that must never be contacted. The task finishes only if a
/// connection arrives, so `assert_untouched` can check on it afterward.
async fn tripwire_controller() -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let _ = listener.accept().await;
    });
    (addr, handle)
}

async fn assert_untouched(tripwire: &JoinHandle<()>) {
    // Any relay attempt completes before the HTTP response does; give the
    // accept task a beat and confirm it never fired.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(
        !tripwire.is_finished(),
        "bridge contacted the controller for a locally-rejected request"
    );
}

fn envelope(message: &str) -> Value {
    json!({"status": "error", "message": message})
}

#[tokio::test]
async fn post_update_passes_through_unchanged() {
    let (seq_addr, handle) = mock_controller(br#"{"status":"ok"}"#.to_vec()).await;
    let base = spawn_bridge(seq_addr.to_string()).await;

    let resp = reqwest::Client::new()
        .post(&base)
        .json(&json!({
            "type": "update_sequence",
            "channel": "channel_1",
            "cv_values": [0.1, 0.5, 0.8, 0.3],
            "gate_states": [1, 0, 1, 0],
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    assert_eq!(resp.text().await.unwrap(), r#"{"status":"ok"}"#);

    let received = handle.await.unwrap();
    let wire: Value = serde_json::from_slice(&received).unwrap();
    assert_eq!(wire["type"], "update_sequence");
    assert_eq!(wire["channel"], "channel_1");
    assert_eq!(wire["cv_values"], json!([0.1, 0.5, 0.8, 0.3]));
    assert_eq!(wire["gate_states"], json!([1, 0, 1, 0]));
}

#[tokio::test]
async fn tempo_query_forwards_value() {
    let (seq_addr, handle) = mock_controller(br#"{"status":"success"}"#.to_vec()).await;
    let base = spawn_bridge(seq_addr.to_string()).await;

    let resp = reqwest::get(format!("{base}/?tempo=120")).await.unwrap();
    assert_eq!(resp.text().await.unwrap(), r#"{"status":"success"}"#);

    let received = handle.await.unwrap();
    let wire: Value = serde_json::from_slice(&received).unwrap();
    assert_eq!(wire, json!({"type": "tempo", "value": 120}));
}

#[tokio::test]
async fn tempo_out_of_range_never_reaches_controller() {
    let (seq_addr, tripwire) = tripwire_controller().await;
    let base = spawn_bridge(seq_addr.to_string()).await;

    let resp = reqwest::get(format!("{base}/?tempo=20")).await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, envelope("Tempo must be between 40 and 300 BPM"));
    assert_untouched(&tripwire).await;
}

#[tokio::test]
async fn invalid_body_never_reaches_controller() {
    let (seq_addr, tripwire) = tripwire_controller().await;
    let base = spawn_bridge(seq_addr.to_string()).await;

    let resp = reqwest::Client::new()
        .post(&base)
        .body("{not json")
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, envelope("Invalid JSON data received"));
    assert_untouched(&tripwire).await;
}

#[tokio::test]
async fn gate_validation_errors_surface() {
    let (seq_addr, _tripwire) = tripwire_controller().await;
    let base = spawn_bridge(seq_addr.to_string()).await;

    let resp = reqwest::Client::new()
        .post(&base)
        .json(&json!({
            "type": "update_sequence",
            "channel": "channel_1",
            "cv_values": [0.5],
            "gate_states": [2],
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, envelope("Invalid gate state. Must be 0 or 1"));
}

#[tokio::test]
async fn missing_field_errors_surface() {
    let (seq_addr, _tripwire) = tripwire_controller().await;
    let base = spawn_bridge(seq_addr.to_string()).await;

    let resp = reqwest::Client::new()
        .post(&base)
        .json(&json!({"type": "update_sequence", "channel": "channel_1"}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, envelope("Missing required sequence data"));
}

#[tokio::test]
async fn command_with_downstream_down_is_connection_envelope() {
    // Grab a free port and close it so the connect is refused.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let seq_addr = listener.local_addr().unwrap();
    drop(listener);

    let base = spawn_bridge(seq_addr.to_string()).await;

    let resp = reqwest::get(format!("{base}/?command=start")).await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    let message = body["message"].as_str().unwrap();
    assert!(
        message.starts_with("Connection failed: "),
        "got {message:?}"
    );
}

#[tokio::test]
async fn get_sequences_query_forwards_tag_only() {
    let reply = br#"{"status":"success","data":{"channel_1":{}}}"#.to_vec();
    let (seq_addr, handle) = mock_controller(reply.clone()).await;
    let base = spawn_bridge(seq_addr.to_string()).await;

    let resp = reqwest::get(format!("{base}/?get_sequences=1")).await.unwrap();
    assert_eq!(resp.bytes().await.unwrap(), reply);

    let received = handle.await.unwrap();
    let wire: Value = serde_json::from_slice(&received).unwrap();
    assert_eq!(wire, json!({"type": "get_sequences"}));
}

#[tokio::test]
async fn unknown_command_tag_passes_through() {
    let (seq_addr, handle) = mock_controller(b"{}".to_vec()).await;
    let base = spawn_bridge(seq_addr.to_string()).await;

    reqwest::get(format!("{base}/?command=calibrate")).await.unwrap();

    let received = handle.await.unwrap();
    let wire: Value = serde_json::from_slice(&received).unwrap();
    assert_eq!(wire, json!({"type": "calibrate"}));
}

#[tokio::test]
async fn command_takes_precedence_over_tempo() {
    let (seq_addr, handle) = mock_controller(b"{}".to_vec()).await;
    let base = spawn_bridge(seq_addr.to_string()).await;

    // Out-of-range tempo is ignored because command dispatches first.
    reqwest::get(format!("{base}/?command=stop&tempo=20"))
        .await
        .unwrap();

    let received = handle.await.unwrap();
    let wire: Value = serde_json::from_slice(&received).unwrap();
    assert_eq!(wire, json!({"type": "stop"}));
}

#[tokio::test]
async fn bare_get_is_no_command() {
    let (seq_addr, _tripwire) = tripwire_controller().await;
    let base = spawn_bridge(seq_addr.to_string()).await;

    let resp = reqwest::get(&base).await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, envelope("No command received"));
}

#[tokio::test]
async fn other_methods_are_unsupported() {
    let (seq_addr, _tripwire) = tripwire_controller().await;
    let base = spawn_bridge(seq_addr.to_string()).await;

    let resp = reqwest::Client::new().delete(&base).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, envelope("Unsupported request method"));
}

#[tokio::test]
async fn post_with_non_update_type_is_unsupported() {
    let (seq_addr, _tripwire) = tripwire_controller().await;
    let base = spawn_bridge(seq_addr.to_string()).await;

    let resp = reqwest::Client::new()
        .post(&base)
        .json(&json!({"type": "start"}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, envelope("Unsupported request method"));
}

#[tokio::test]
async fn health_is_bridge_local() {
    let (seq_addr, _tripwire) = tripwire_controller().await;
    let base = spawn_bridge(seq_addr.to_string()).await;

    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["sequencer"], seq_addr.to_string());
    assert!(body["uptime_secs"].is_u64());
}
