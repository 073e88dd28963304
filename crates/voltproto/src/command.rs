//! Canonical sequencer commands.
//!
//! A [`Command`] is the validated, normalized form of an inbound request,
//! ready for wire encoding. The controller receives one JSON document per
//! connection with a `type` tag plus the variant's fields, nothing else.

use serde_json::{json, Value};

/// All commands the bridge forwards. Discriminated by `type` on the wire.
///
/// The vocabulary is open: tags the bridge does not recognize are carried
/// by [`Command::Other`] and forwarded unmodified. Only `update_sequence`
/// and `tempo` carry fields; everything else is the tag alone.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the CV/gate sequence for one channel.
    UpdateSequence {
        channel: String,
        cv_values: Vec<f64>,
        gate_states: Vec<u8>,
    },
    /// Set the transport tempo in BPM.
    Tempo { value: i64 },
    /// Start playback.
    Start,
    /// Stop playback.
    Stop,
    /// Fetch the controller's current sequence data.
    GetSequences,
    /// Passthrough for a caller-supplied tag the bridge does not know.
    Other(String),
}

impl Command {
    /// The tag as it appears in the wire `type` field.
    pub fn tag(&self) -> &str {
        match self {
            Self::UpdateSequence { .. } => "update_sequence",
            Self::Tempo { .. } => "tempo",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::GetSequences => "get_sequences",
            Self::Other(tag) => tag,
        }
    }

    /// Build a bare transport command from a caller-supplied tag.
    ///
    /// No field validation happens on this path; an unknown tag is
    /// forwarded rather than rejected.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "start" => Self::Start,
            "stop" => Self::Stop,
            "get_sequences" => Self::GetSequences,
            other => Self::Other(other.to_string()),
        }
    }

    /// The exact JSON document transmitted downstream.
    pub fn to_wire(&self) -> Value {
        match self {
            Self::UpdateSequence {
                channel,
                cv_values,
                gate_states,
            } => json!({
                "type": "update_sequence",
                "channel": channel,
                "cv_values": cv_values,
                "gate_states": gate_states,
            }),
            Self::Tempo { value } => json!({ "type": "tempo", "value": value }),
            other => json!({ "type": other.tag() }),
        }
    }
}
