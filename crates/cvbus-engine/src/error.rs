//! Error types for the routing handoff.

use thiserror::Error;

use crate::RouteCommand;

/// Errors from queueing a routing edit.
///
/// Edits that reach the audio thread but are refused there are not errors of
/// the handle; they come back as [`RouteEvent::Rejected`](crate::RouteEvent).
#[derive(Debug, Error)]
pub enum EngineError {
    /// The command queue is full; the edit was not queued.
    #[error("command queue full, dropped: {0}")]
    QueueFull(RouteCommand),

    /// The processor side has been dropped.
    #[error("router processor disconnected")]
    Disconnected,
}
