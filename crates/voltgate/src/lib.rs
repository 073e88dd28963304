//! voltgate - validating HTTP bridge for a networked Eurorack sequencer
//!
//! The browser control panel talks HTTP to this bridge; the bridge talks
//! one-shot JSON-over-TCP to the sequencer controller. Validation lives
//! in `voltproto` and happens before anything touches the network. The
//! bridge itself is stateless: sequence, tempo, and transport state all
//! live in the controller.

pub mod config;
pub mod relay;
pub mod serve;

pub use config::BridgeConfig;
pub use relay::RelayClient;
