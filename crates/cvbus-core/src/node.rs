//! Endpoint addressing for the CV routing graph.
//!
//! A [`Node`] names one endpoint inside the plugin graph: a plugin, the kind of
//! port on that plugin, and a kind-specific 32-bit value. Nodes are plain
//! values; they are created when a link is described and never mutated.
//!
//! | [`PortKind`] | meaning of `value` |
//! |---|---|
//! | `Audio` | 1-based channel index into the plugin's feedback buffer |
//! | `Param` | global parameter index |
//! | `Track` | high 16 bits: track index, low 16 bits: parameter index |
//! | `Cv` | index into the plugin's declared CV port list |

/// Identifier of a plugin inside the host graph.
///
/// Assigned by the host. The routing core never allocates or reuses them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PluginId(pub u32);

impl PluginId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for PluginId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "PluginId({})", self.0)
    }
}

/// The kind of endpoint a [`Node`] addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// An audio channel of the plugin's output.
    Audio,
    /// A global (non-track) parameter.
    Param,
    /// A per-track parameter.
    Track,
    /// A declared CV port.
    Cv,
}

/// Direction of a port, seen from the plugin that owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortFlow {
    /// The plugin reads this port.
    Input,
    /// The plugin writes this port.
    Output,
}

/// Which parameter table a [`ParamAddress`] points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamGroup {
    /// Plugin-wide parameters.
    Global,
    /// Parameters repeated per track.
    Track,
}

/// Decoded location of a parameter, used by the legacy parameter path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParamAddress {
    /// Parameter table.
    pub group: ParamGroup,
    /// Track index (always 0 for [`ParamGroup::Global`]).
    pub track: u16,
    /// Parameter index within the table.
    pub index: u32,
}

impl ParamAddress {
    /// Address of a global parameter.
    pub const fn global(index: u32) -> Self {
        Self {
            group: ParamGroup::Global,
            track: 0,
            index,
        }
    }

    /// Address of a per-track parameter.
    pub const fn track(track: u16, index: u16) -> Self {
        Self {
            group: ParamGroup::Track,
            track,
            index: index as u32,
        }
    }
}

/// Address of one endpoint in the plugin graph.
///
/// Equality is structural over all three fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Node {
    /// Owning plugin.
    pub plugin_id: PluginId,
    /// Kind of endpoint.
    pub port_kind: PortKind,
    /// Kind-specific payload (see the module table).
    pub value: u32,
}

impl Node {
    /// Creates a node from its raw parts.
    pub const fn new(plugin_id: PluginId, port_kind: PortKind, value: u32) -> Self {
        Self {
            plugin_id,
            port_kind,
            value,
        }
    }

    /// Audio channel node. `channel` is 1-based.
    pub const fn audio(plugin_id: PluginId, channel: u32) -> Self {
        Self::new(plugin_id, PortKind::Audio, channel)
    }

    /// Global parameter node.
    pub const fn param(plugin_id: PluginId, index: u32) -> Self {
        Self::new(plugin_id, PortKind::Param, index)
    }

    /// Per-track parameter node, packing `track` into the high half.
    pub const fn track(plugin_id: PluginId, track: u16, index: u16) -> Self {
        Self::new(
            plugin_id,
            PortKind::Track,
            ((track as u32) << 16) | index as u32,
        )
    }

    /// CV port node.
    pub const fn cv(plugin_id: PluginId, port: u32) -> Self {
        Self::new(plugin_id, PortKind::Cv, port)
    }

    /// Decodes the parameter location for `Param` and `Track` nodes.
    ///
    /// Returns `None` for `Audio` and `Cv` nodes.
    pub const fn param_address(&self) -> Option<ParamAddress> {
        match self.port_kind {
            PortKind::Param => Some(ParamAddress::global(self.value)),
            PortKind::Track => Some(ParamAddress::track(
                (self.value >> 16) as u16,
                (self.value & 0xFFFF) as u16,
            )),
            PortKind::Audio | PortKind::Cv => None,
        }
    }

    /// Zero-based feedback channel for `Audio` nodes.
    ///
    /// Returns `None` for other kinds and for the invalid channel `0`.
    pub const fn channel(&self) -> Option<usize> {
        match self.port_kind {
            PortKind::Audio if self.value > 0 => Some(self.value as usize - 1),
            _ => None,
        }
    }
}

impl core::fmt::Display for Node {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.port_kind {
            PortKind::Audio => write!(f, "{}:audio[{}]", self.plugin_id.0, self.value),
            PortKind::Param => write!(f, "{}:param[{}]", self.plugin_id.0, self.value),
            PortKind::Track => write!(
                f,
                "{}:track[{}][{}]",
                self.plugin_id.0,
                self.value >> 16,
                self.value & 0xFFFF
            ),
            PortKind::Cv => write!(f, "{}:cv[{}]", self.plugin_id.0, self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_structural() {
        let a = Node::param(PluginId(2), 5);
        assert_eq!(a, Node::new(PluginId(2), PortKind::Param, 5));
        assert_ne!(a, Node::param(PluginId(2), 6));
        assert_ne!(a, Node::cv(PluginId(2), 5));
        assert_ne!(a, Node::param(PluginId(3), 5));
    }

    #[test]
    fn track_packing_round_trips() {
        let node = Node::track(PluginId(1), 3, 17);
        assert_eq!(node.value, (3 << 16) | 17);
        assert_eq!(node.param_address(), Some(ParamAddress::track(3, 17)));
    }

    #[test]
    fn param_address_only_for_parameters() {
        assert_eq!(
            Node::param(PluginId(0), 9).param_address(),
            Some(ParamAddress::global(9))
        );
        assert_eq!(Node::audio(PluginId(0), 1).param_address(), None);
        assert_eq!(Node::cv(PluginId(0), 0).param_address(), None);
    }

    #[test]
    fn audio_channel_is_one_based() {
        assert_eq!(Node::audio(PluginId(0), 1).channel(), Some(0));
        assert_eq!(Node::audio(PluginId(0), 2).channel(), Some(1));
        assert_eq!(Node::audio(PluginId(0), 0).channel(), None);
        assert_eq!(Node::param(PluginId(0), 1).channel(), None);
    }
}
