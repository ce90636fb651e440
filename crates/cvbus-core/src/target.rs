//! Downstream adapters: write a finished [`Data`] block to one consuming endpoint.
//!
//! Built like [`Source`](crate::Source): [`Target::create`] picks the variant,
//! [`Target::initialize`] binds the consuming plugin once, and
//! [`Target::send`] runs once per block.
//!
//! | variant | bound to | writes |
//! |---|---|---|
//! | `AudioStream` | nothing | nothing (audio mixing lives elsewhere) |
//! | `LegacyParam` | parameter address + descriptor | 0..1 scaled back to the raw range |
//! | `PortParam` | input port slot | `set_value(data.get())` |
//! | `PortStream` | input port slot | `set_block(data.get_block(n))` |

use crate::connector::ConnectorOpts;
use crate::data::Data;
use crate::data_type::DataType;
use crate::error::RouteError;
use crate::node::{Node, ParamAddress, PortFlow};
use crate::param_info::ParamDescriptor;
use crate::port::{Plugin, PluginHost, PortSlot};

/// Placeholder for audio-typed targets.
#[derive(Debug, Clone)]
pub struct AudioStreamTarget {
    node: Node,
    opts: ConnectorOpts,
    initialized: bool,
}

/// Writes a raw-integer parameter through the direct-set path.
#[derive(Debug, Clone)]
pub struct LegacyParamTarget {
    node: Node,
    opts: ConnectorOpts,
    binding: Option<(ParamAddress, ParamDescriptor)>,
}

/// Writes a typed input port.
#[derive(Debug, Clone)]
pub struct PortTarget {
    node: Node,
    opts: ConnectorOpts,
    slot: Option<PortSlot>,
}

impl PortTarget {
    fn new(node: Node, opts: ConnectorOpts) -> Self {
        Self {
            node,
            opts,
            slot: None,
        }
    }
}

/// The consuming endpoint of a transporter.
#[derive(Debug, Clone)]
pub enum Target {
    /// Audio placeholder.
    AudioStream(AudioStreamTarget),
    /// Raw-integer parameter.
    LegacyParam(LegacyParamTarget),
    /// Scalar typed port.
    PortParam(PortTarget),
    /// Block-rate typed port.
    PortStream(PortTarget),
}

impl Target {
    /// Creates an unbound target of the given representation.
    pub fn create(kind: DataType, node: Node, opts: ConnectorOpts) -> Self {
        match kind {
            DataType::AudioStream => Self::AudioStream(AudioStreamTarget {
                node,
                opts,
                initialized: false,
            }),
            DataType::LegacyParam => Self::LegacyParam(LegacyParamTarget {
                node,
                opts,
                binding: None,
            }),
            DataType::PortParam => Self::PortParam(PortTarget::new(node, opts)),
            DataType::PortStream => Self::PortStream(PortTarget::new(node, opts)),
        }
    }

    /// Resolves the endpoint's representation against `to` and binds it.
    pub fn build(node: Node, opts: ConnectorOpts, to: &dyn Plugin) -> Result<Self, RouteError> {
        let kind = DataType::resolve(node, PortFlow::Input, to)?;
        let mut target = Self::create(kind, node, opts);
        target.initialize(to)?;
        Ok(target)
    }

    /// Binds the target to the consuming plugin. Called exactly once.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] if the node does not address an existing
    /// parameter or input port. The target stays unbound.
    pub fn initialize(&mut self, to: &dyn Plugin) -> Result<(), RouteError> {
        debug_assert!(!self.is_initialized(), "target initialized twice");
        match self {
            Self::AudioStream(t) => t.initialized = true,
            Self::LegacyParam(t) => {
                let address = t
                    .node
                    .param_address()
                    .ok_or(RouteError::ParamNotFound(t.node))?;
                let descriptor = to
                    .param_info(address)
                    .ok_or(RouteError::ParamNotFound(t.node))?;
                t.binding = Some((address, descriptor));
            }
            Self::PortParam(t) | Self::PortStream(t) => {
                let flow = PortFlow::Input;
                let slot = to
                    .find_port(t.node.port_kind, flow, t.node.value)
                    .ok_or(RouteError::PortNotFound { node: t.node, flow })?;
                t.slot = Some(slot);
            }
        }
        Ok(())
    }

    /// Writes the finished block to the consuming endpoint.
    ///
    /// An unbound target, or a consumer the host no longer knows, is skipped.
    #[inline]
    pub fn send(&mut self, host: &mut dyn PluginHost, data: &Data, n: usize) {
        let node = self.node();
        match self {
            Self::AudioStream(_) => {}
            Self::LegacyParam(t) => {
                if let Some((address, descriptor)) = t.binding
                    && let Some(plugin) = host.plugin_mut(node.plugin_id)
                {
                    plugin.set_param_direct(address, descriptor.scale(data.get()));
                }
            }
            Self::PortParam(t) => {
                if let Some(slot) = t.slot
                    && let Some(port) = port_mut(host, node, slot)
                {
                    port.set_value(data.get());
                }
            }
            Self::PortStream(t) => {
                if let Some(slot) = t.slot
                    && let Some(port) = port_mut(host, node, slot)
                {
                    port.set_block(data.get_block(n));
                }
            }
        }
    }

    /// Returns the consuming endpoint.
    pub fn node(&self) -> Node {
        match self {
            Self::AudioStream(t) => t.node,
            Self::LegacyParam(t) => t.node,
            Self::PortParam(t) | Self::PortStream(t) => t.node,
        }
    }

    /// Returns the link options of the connector that created this target.
    pub fn opts(&self) -> ConnectorOpts {
        match self {
            Self::AudioStream(t) => t.opts,
            Self::LegacyParam(t) => t.opts,
            Self::PortParam(t) | Self::PortStream(t) => t.opts,
        }
    }

    /// Returns the representation of the consuming endpoint.
    pub fn kind(&self) -> DataType {
        match self {
            Self::AudioStream(_) => DataType::AudioStream,
            Self::LegacyParam(_) => DataType::LegacyParam,
            Self::PortParam(_) => DataType::PortParam,
            Self::PortStream(_) => DataType::PortStream,
        }
    }

    /// Returns true once [`initialize`](Self::initialize) has succeeded.
    pub fn is_initialized(&self) -> bool {
        match self {
            Self::AudioStream(t) => t.initialized,
            Self::LegacyParam(t) => t.binding.is_some(),
            Self::PortParam(t) | Self::PortStream(t) => t.slot.is_some(),
        }
    }
}

#[inline]
fn port_mut(
    host: &mut dyn PluginHost,
    node: Node,
    slot: PortSlot,
) -> Option<&mut dyn crate::port::Port> {
    host.plugin_mut(node.plugin_id)?.port_mut(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferMode;
    use crate::node::{PluginId, PortKind};
    use crate::port::{Port, StreamPort, ValuePort};

    const ID: PluginId = PluginId(3);

    struct Consumer {
        param_in: ValuePort,
        stream_in: StreamPort,
        raw: i32,
    }

    impl Plugin for Consumer {
        fn find_port(&self, kind: PortKind, flow: PortFlow, value: u32) -> Option<PortSlot> {
            if flow != PortFlow::Input {
                return None;
            }
            match (kind, value) {
                (PortKind::Param, 5) => Some(PortSlot(0)),
                (PortKind::Cv, 0) => Some(PortSlot(1)),
                _ => None,
            }
        }
        fn port(&self, slot: PortSlot) -> Option<&dyn Port> {
            match slot.0 {
                0 => Some(&self.param_in),
                1 => Some(&self.stream_in),
                _ => None,
            }
        }
        fn port_mut(&mut self, slot: PortSlot) -> Option<&mut dyn Port> {
            match slot.0 {
                0 => Some(&mut self.param_in),
                1 => Some(&mut self.stream_in),
                _ => None,
            }
        }
        fn param_info(&self, address: ParamAddress) -> Option<ParamDescriptor> {
            (address == ParamAddress::track(1, 2)).then_some(ParamDescriptor::new(0, 200, 0))
        }
        fn set_param_direct(&mut self, _address: ParamAddress, value: i32) {
            self.raw = value;
        }
    }

    struct Host(Consumer);

    impl PluginHost for Host {
        fn plugin(&self, id: PluginId) -> Option<&dyn Plugin> {
            (id == ID).then_some(&self.0 as &dyn Plugin)
        }
        fn plugin_mut(&mut self, id: PluginId) -> Option<&mut dyn Plugin> {
            (id == ID).then_some(&mut self.0 as &mut dyn Plugin)
        }
    }

    fn host() -> Host {
        Host(Consumer {
            param_in: ValuePort::new(PortFlow::Input, PortKind::Param, 0.0),
            stream_in: StreamPort::new(PortFlow::Input, PortKind::Cv, BufferMode::Ring, 4),
            raw: 0,
        })
    }

    fn send(node: Node, fill: impl Fn(&mut Data)) -> Host {
        let mut host = host();
        let mut target = Target::build(node, ConnectorOpts::default(), &host.0).unwrap();
        let mut data = Data::create(target.kind(), 4);
        data.reset(4);
        fill(&mut data);
        target.send(&mut host, &data, 4);
        host
    }

    #[test]
    fn port_param_sets_scalar() {
        let host = send(Node::param(ID, 5), |d| d.add(0.7));
        assert!((host.0.param_in.value() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn port_stream_pushes_block() {
        let host = send(Node::cv(ID, 0), |d| d.add_block(&[1.0, 2.0, 3.0, 4.0]));
        let mut out = [0.0; 4];
        host.0.stream_in.get_block(&mut out, false);
        assert_eq!(out, [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn legacy_param_scales_to_raw() {
        let host = send(Node::track(ID, 1, 2), |d| d.add(0.5));
        assert_eq!(host.0.raw, 100);
    }

    #[test]
    fn audio_target_is_a_no_op() {
        let mut host = host();
        let mut target = Target::build(Node::audio(ID, 1), ConnectorOpts::default(), &host.0)
            .expect("audio targets always bind");
        assert_eq!(target.kind(), DataType::AudioStream);
        assert!(target.is_initialized());
        let mut data = Data::create(DataType::AudioStream, 4);
        data.reset(4);
        target.send(&mut host, &data, 4);
    }

    #[test]
    fn missing_input_port_is_rejected() {
        let host = host();
        let node = Node::cv(ID, 3);
        assert_eq!(
            Target::build(node, ConnectorOpts::default(), &host.0).unwrap_err(),
            RouteError::PortNotFound {
                node,
                flow: PortFlow::Input
            }
        );
    }
}
