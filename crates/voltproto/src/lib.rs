//! voltproto - command types and validation for the voltgate bridge
//!
//! This crate defines the commands the bridge forwards to the sequencer
//! controller and the validation rules applied before anything touches
//! the network. Everything here is purely functional over parsed JSON;
//! the `voltgate` crate owns the HTTP surface and the TCP relay.
//!
//! ## Open command vocabulary
//!
//! The bridge does not maintain a closed list of commands. Tags it
//! recognizes (`update_sequence`, `tempo`, `start`, `stop`,
//! `get_sequences`) get typed variants; anything else is carried by
//! [`Command::Other`] and forwarded as `{"type": <tag>}` untouched.
//! The controller owns the final say on what a tag means.
//!
//! ## Error envelope
//!
//! Every bridge-local failure - validation or relay - is surfaced to
//! the caller as exactly `{"status":"error","message":<string>}`. A
//! successful relay returns the controller's bytes verbatim; the two
//! paths never merge.

pub mod command;
pub mod error;
pub mod validate;

pub use command::Command;
pub use error::BridgeError;
