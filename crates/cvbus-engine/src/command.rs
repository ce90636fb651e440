//! Routing edits and their outcomes, as sent across the thread boundary.

use std::fmt;

use cvbus_core::{Connector, Node, PluginId, RouteError};

/// Structural edit sent from a control thread to the audio thread.
///
/// Commands are queued by [`RouterHandle`](crate::RouterHandle) and applied
/// by [`RouterProcessor`](crate::RouterProcessor) before the next block
/// renders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteCommand {
    /// Add a link.
    Connect(Connector),
    /// Remove a link.
    Disconnect(Connector),
    /// Reorder the sources feeding one target.
    MoveSource {
        /// Target whose sources are reordered.
        target: Node,
        /// Current position.
        from: usize,
        /// New position.
        to: usize,
    },
    /// Remove every link touching a plugin.
    RemovePlugin(PluginId),
    /// Remove every link.
    Clear,
}

impl fmt::Display for RouteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(c) => write!(f, "connect {c}"),
            Self::Disconnect(c) => write!(f, "disconnect {c}"),
            Self::MoveSource { target, from, to } => {
                write!(f, "move source {from} -> {to} into {target}")
            }
            Self::RemovePlugin(id) => write!(f, "remove {id}"),
            Self::Clear => write!(f, "clear"),
        }
    }
}

/// Outcome of one applied command, reported back to the control thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteEvent {
    /// The command changed the routing table.
    Applied(RouteCommand),
    /// The command was refused; the routing table is unchanged.
    Rejected {
        /// The refused command.
        command: RouteCommand,
        /// Why it was refused.
        error: RouteError,
    },
}

impl RouteEvent {
    /// Returns the command this event reports on.
    pub fn command(&self) -> RouteCommand {
        match self {
            Self::Applied(command) | Self::Rejected { command, .. } => *command,
        }
    }

    /// Returns true for [`RouteEvent::Applied`].
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}
