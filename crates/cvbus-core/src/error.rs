//! Errors raised while editing routes.
//!
//! Every error here is detected at graph-edit time, when a connector is
//! resolved against live plugin metadata. A rejected edit leaves the routing
//! state untouched, so the per-block render path never sees an address that
//! failed to resolve and has no error path of its own.

use crate::node::{Node, PluginId, PortFlow};

/// Errors that can occur while adding, removing, or reordering links.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteError {
    /// The host has no plugin with this ID.
    PluginNotFound(PluginId),
    /// The node does not resolve to a typed port in the given direction.
    PortNotFound {
        /// Unresolved endpoint.
        node: Node,
        /// Direction that was queried.
        flow: PortFlow,
    },
    /// An audio node names a feedback channel the plugin does not have.
    ChannelNotFound(Node),
    /// A legacy parameter node names a parameter the plugin does not expose.
    ParamNotFound(Node),
    /// A connector with the same endpoints is already routed.
    DuplicateConnector {
        /// Producing endpoint.
        source: Node,
        /// Consuming endpoint.
        target: Node,
    },
    /// No connector with these endpoints is routed.
    ConnectorNotFound {
        /// Producing endpoint.
        source: Node,
        /// Consuming endpoint.
        target: Node,
    },
    /// A connector was handed to the transporter of a different target.
    TargetMismatch {
        /// Target the transporter serves.
        expected: Node,
        /// Target named by the connector.
        found: Node,
    },
    /// No transporter serves this target.
    UnknownTarget(Node),
    /// A source position is out of range.
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Number of sources.
        len: usize,
    },
}

impl core::fmt::Display for RouteError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PluginNotFound(id) => write!(f, "plugin {id} not found"),
            Self::PortNotFound { node, flow } => {
                write!(f, "no {flow:?} port at {node}")
            }
            Self::ChannelNotFound(node) => write!(f, "no feedback channel at {node}"),
            Self::ParamNotFound(node) => write!(f, "no parameter at {node}"),
            Self::DuplicateConnector { source, target } => {
                write!(f, "link {source} → {target} already exists")
            }
            Self::ConnectorNotFound { source, target } => {
                write!(f, "link {source} → {target} not found")
            }
            Self::TargetMismatch { expected, found } => {
                write!(f, "transporter for {expected} cannot accept a link into {found}")
            }
            Self::UnknownTarget(node) => write!(f, "no links into {node}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "source index {index} out of range for {len} sources")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RouteError {}
