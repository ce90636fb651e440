//! Wire-representation resolution.
//!
//! Each endpoint of a link is carried in one of four representations. Which
//! one is decided by introspecting the live plugin once, when the link is
//! built; the per-block path only ever matches on the resolved [`DataType`].

use crate::error::RouteError;
use crate::node::{Node, PortFlow, PortKind};
use crate::port::Plugin;

/// Wire representation of one link endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Raw audio from the plugin's feedback buffer.
    AudioStream,
    /// Raw-integer parameter without a typed port.
    LegacyParam,
    /// Scalar typed port.
    PortParam,
    /// Block-rate typed port.
    PortStream,
}

impl DataType {
    /// Resolves the representation of `node` seen in direction `flow`.
    ///
    /// - `Audio` → [`AudioStream`](Self::AudioStream)
    /// - `Param`/`Track` → [`PortParam`](Self::PortParam) if the plugin has a
    ///   typed port at that address, else [`LegacyParam`](Self::LegacyParam)
    /// - `Cv` → the address must name a typed port; its declared kind picks
    ///   [`PortParam`](Self::PortParam) (`Param`/`Track`) or
    ///   [`PortStream`](Self::PortStream) (anything else)
    ///
    /// # Errors
    ///
    /// [`RouteError::PortNotFound`] if a `Cv` node names no port.
    pub fn resolve(node: Node, flow: PortFlow, plugin: &dyn Plugin) -> Result<Self, RouteError> {
        let resolved = match node.port_kind {
            PortKind::Audio => Self::AudioStream,
            PortKind::Param | PortKind::Track => {
                match plugin.find_port(node.port_kind, flow, node.value) {
                    Some(_) => Self::PortParam,
                    None => Self::LegacyParam,
                }
            }
            PortKind::Cv => {
                let slot = plugin
                    .find_port(node.port_kind, flow, node.value)
                    .ok_or(RouteError::PortNotFound { node, flow })?;
                let port = plugin
                    .port(slot)
                    .ok_or(RouteError::PortNotFound { node, flow })?;
                match port.kind() {
                    PortKind::Param | PortKind::Track => Self::PortParam,
                    PortKind::Audio | PortKind::Cv => Self::PortStream,
                }
            }
        };
        #[cfg(feature = "tracing")]
        tracing::debug!("resolve: {node} ({flow:?}) → {resolved:?}");
        Ok(resolved)
    }

    /// Returns true for block-shaped representations.
    #[inline]
    pub const fn is_stream(self) -> bool {
        matches!(self, Self::AudioStream | Self::PortStream)
    }
}
