//! Element-wise validation of inbound command descriptions.
//!
//! Rules mirror what the controller expects on its pins: CV in [0, 1],
//! gates exactly 0 or 1, tempo in [40, 300] BPM. Sequence length is
//! deliberately not checked - step-count semantics belong to the
//! controller, not the bridge.
//!
//! Validation short-circuits on the first violation; later elements are
//! never inspected.

use serde_json::Value;

use crate::command::Command;
use crate::error::BridgeError;

/// Tempo bounds in BPM, inclusive on both ends.
pub const TEMPO_MIN: i64 = 40;
pub const TEMPO_MAX: i64 = 300;

/// Validate a raw POST body into a canonical command.
///
/// Only `update_sequence` is accepted on the body path. Any other tag
/// falls through to [`BridgeError::UnsupportedMethod`], matching the
/// original bridge's dispatch (tempo and transport are query-only).
pub fn validate_post(raw: &[u8]) -> Result<Command, BridgeError> {
    let body: Value = serde_json::from_slice(raw).map_err(|_| BridgeError::InvalidPayload)?;
    if body.get("type").and_then(Value::as_str) != Some("update_sequence") {
        return Err(BridgeError::UnsupportedMethod);
    }
    validate_update(&body)
}

/// Validate the fields of an `update_sequence` body.
pub fn validate_update(body: &Value) -> Result<Command, BridgeError> {
    let Some(channel) = body.get("channel").and_then(Value::as_str) else {
        return Err(BridgeError::MissingField);
    };
    let Some(cv_values) = body.get("cv_values").and_then(Value::as_array) else {
        return Err(BridgeError::MissingField);
    };
    let Some(gate_states) = body.get("gate_states").and_then(Value::as_array) else {
        return Err(BridgeError::MissingField);
    };

    let mut cvs = Vec::with_capacity(cv_values.len());
    for cv in cv_values {
        let v = cv.as_f64().ok_or(BridgeError::InvalidCv)?;
        if !(0.0..=1.0).contains(&v) {
            return Err(BridgeError::InvalidCv);
        }
        cvs.push(v);
    }

    let mut gates = Vec::with_capacity(gate_states.len());
    for gate in gate_states {
        // Integer 0 or 1 only: 0.5, 2, 1.0, and strings are all rejected.
        match gate.as_u64() {
            Some(g @ (0 | 1)) => gates.push(g as u8),
            _ => return Err(BridgeError::InvalidGate),
        }
    }

    Ok(Command::UpdateSequence {
        channel: channel.to_string(),
        cv_values: cvs,
        gate_states: gates,
    })
}

/// Validate a raw tempo query value into a canonical command.
pub fn validate_tempo(raw: &str) -> Result<Command, BridgeError> {
    let value = coerce_tempo(raw);
    if !(TEMPO_MIN..=TEMPO_MAX).contains(&value) {
        return Err(BridgeError::InvalidTempo);
    }
    Ok(Command::Tempo { value })
}

/// Coerce a raw query value to an integer the way the original bridge
/// did: leading digits parse (with optional sign), a float truncates at
/// the decimal point, and garbage coerces to 0 - which then fails the
/// range check rather than erroring on its own.
pub fn coerce_tempo(raw: &str) -> i64 {
    let s = raw.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}
