//! Upstream adapters: read one producing endpoint into a target's [`Data`].
//!
//! A [`Source`] is built in two steps. [`Source::create`] picks the variant
//! from the endpoint's resolved [`DataType`]; [`Source::initialize`] then binds
//! a direct handle into the producing plugin (a feedback channel, a parameter
//! and its range, or a port slot) and allocates any scratch space. After that
//! [`Source::work`] runs once per block without allocating or searching.
//!
//! | variant | bound to | contributes |
//! |---|---|---|
//! | `AudioStream` | feedback channel `value - 1` | one block |
//! | `LegacyParam` | parameter address + descriptor | raw value normalized to 0..1 |
//! | `PortParam` | output port slot | `get_value()` |
//! | `PortStream` | output port slot | `get_value()` |
//!
//! The `PortStream` source reads a scalar, unlike the `PortStream` target,
//! which pushes a whole block. The asymmetry is deliberate and kept as is.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::connector::ConnectorOpts;
use crate::data::Data;
use crate::data_type::DataType;
use crate::error::RouteError;
use crate::node::{Node, ParamAddress, PortFlow};
use crate::param_info::ParamDescriptor;
use crate::port::{Plugin, PluginHost, PortSlot};

/// Reads the producing plugin's audio feedback buffer.
#[derive(Debug, Clone)]
pub struct AudioStreamSource {
    node: Node,
    opts: ConnectorOpts,
    channel: Option<usize>,
    scratch: Vec<f32>,
}

/// Reads a raw-integer parameter and normalizes it.
#[derive(Debug, Clone)]
pub struct LegacyParamSource {
    node: Node,
    opts: ConnectorOpts,
    binding: Option<(ParamAddress, ParamDescriptor)>,
}

/// Reads the scalar value of a typed output port.
#[derive(Debug, Clone)]
pub struct PortSource {
    node: Node,
    opts: ConnectorOpts,
    slot: Option<PortSlot>,
}

impl PortSource {
    fn new(node: Node, opts: ConnectorOpts) -> Self {
        Self {
            node,
            opts,
            slot: None,
        }
    }
}

/// One producing endpoint feeding a transporter.
#[derive(Debug, Clone)]
pub enum Source {
    /// Audio feedback channel.
    AudioStream(AudioStreamSource),
    /// Raw-integer parameter.
    LegacyParam(LegacyParamSource),
    /// Scalar typed port.
    PortParam(PortSource),
    /// Block-rate typed port, read as a scalar.
    PortStream(PortSource),
}

impl Source {
    /// Creates an unbound source of the given representation.
    pub fn create(kind: DataType, node: Node, opts: ConnectorOpts) -> Self {
        match kind {
            DataType::AudioStream => Self::AudioStream(AudioStreamSource {
                node,
                opts,
                channel: None,
                scratch: Vec::new(),
            }),
            DataType::LegacyParam => Self::LegacyParam(LegacyParamSource {
                node,
                opts,
                binding: None,
            }),
            DataType::PortParam => Self::PortParam(PortSource::new(node, opts)),
            DataType::PortStream => Self::PortStream(PortSource::new(node, opts)),
        }
    }

    /// Resolves the endpoint's representation against `from` and binds it.
    pub fn build(
        node: Node,
        opts: ConnectorOpts,
        from: &dyn Plugin,
        block_size: usize,
    ) -> Result<Self, RouteError> {
        let kind = DataType::resolve(node, PortFlow::Output, from)?;
        let mut source = Self::create(kind, node, opts);
        source.initialize(from, block_size)?;
        Ok(source)
    }

    /// Binds the source to the producing plugin. Called exactly once.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] if the node does not address an existing
    /// channel, parameter, or output port. The source stays unbound.
    pub fn initialize(&mut self, from: &dyn Plugin, block_size: usize) -> Result<(), RouteError> {
        debug_assert!(!self.is_initialized(), "source initialized twice");
        match self {
            Self::AudioStream(s) => {
                let channel = s
                    .node
                    .channel()
                    .filter(|&c| c < from.feedback_channels())
                    .ok_or(RouteError::ChannelNotFound(s.node))?;
                s.channel = Some(channel);
                s.scratch = vec![0.0; block_size];
            }
            Self::LegacyParam(s) => {
                let address = s
                    .node
                    .param_address()
                    .ok_or(RouteError::ParamNotFound(s.node))?;
                let descriptor = from
                    .param_info(address)
                    .ok_or(RouteError::ParamNotFound(s.node))?;
                s.binding = Some((address, descriptor));
            }
            Self::PortParam(s) | Self::PortStream(s) => {
                let flow = PortFlow::Output;
                let slot = from
                    .find_port(s.node.port_kind, flow, s.node.value)
                    .ok_or(RouteError::PortNotFound { node: s.node, flow })?;
                s.slot = Some(slot);
            }
        }
        Ok(())
    }

    /// Adds this block's contribution of the producing endpoint into `data`.
    ///
    /// `use_current_frame` is `true` when the producer has already run this
    /// block; otherwise feedback reads fall back to the previous block.
    /// An unbound source, or a producer the host no longer knows, contributes
    /// nothing.
    #[inline]
    pub fn work(
        &mut self,
        host: &dyn PluginHost,
        data: &mut Data,
        n: usize,
        use_current_frame: bool,
    ) {
        let Some(plugin) = host.plugin(self.node().plugin_id) else {
            return;
        };
        match self {
            Self::AudioStream(s) => {
                if let Some(channel) = s.channel {
                    let block = &mut s.scratch[..n];
                    if plugin.read_feedback(channel, block, !use_current_frame) {
                        data.add_block(block);
                    }
                }
            }
            Self::LegacyParam(s) => {
                if let Some((address, descriptor)) = s.binding {
                    data.add(descriptor.normalize(plugin.param_value(address)));
                }
            }
            Self::PortParam(s) | Self::PortStream(s) => {
                if let Some(port) = s.slot.and_then(|slot| plugin.port(slot)) {
                    data.add(port.get_value());
                }
            }
        }
    }

    /// Returns the producing endpoint.
    pub fn node(&self) -> Node {
        match self {
            Self::AudioStream(s) => s.node,
            Self::LegacyParam(s) => s.node,
            Self::PortParam(s) | Self::PortStream(s) => s.node,
        }
    }

    /// Returns the link options this source was built with.
    pub fn opts(&self) -> ConnectorOpts {
        match self {
            Self::AudioStream(s) => s.opts,
            Self::LegacyParam(s) => s.opts,
            Self::PortParam(s) | Self::PortStream(s) => s.opts,
        }
    }

    /// Returns the representation of the producing endpoint.
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
            Self::AudioStream(s) => s.channel.is_some(),
            Self::LegacyParam(s) => s.binding.is_some(),
            Self::PortParam(s) | Self::PortStream(s) => s.slot.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{PluginId, PortKind};
    use crate::port::{Port, ValuePort};

    const ID: PluginId = PluginId(7);

    struct Producer {
        out: ValuePort,
        feedback: Vec<f32>,
        previous: Vec<f32>,
        raw: i32,
    }

    impl Plugin for Producer {
        fn find_port(&self, kind: PortKind, flow: PortFlow, value: u32) -> Option<PortSlot> {
            (kind == PortKind::Cv && flow == PortFlow::Output && value == 0).then_some(PortSlot(0))
        }
        fn port(&self, slot: PortSlot) -> Option<&dyn Port> {
            (slot.0 == 0).then_some(&self.out as &dyn Port)
        }
        fn port_mut(&mut self, slot: PortSlot) -> Option<&mut dyn Port> {
            (slot.0 == 0).then_some(&mut self.out as &mut dyn Port)
        }
        fn feedback_channels(&self) -> usize {
            1
        }
        fn read_feedback(&self, channel: usize, dest: &mut [f32], delay_frame: bool) -> bool {
            if channel != 0 {
                return false;
            }
            let src = if delay_frame { &self.previous } else { &self.feedback };
            dest.copy_from_slice(&src[..dest.len()]);
            true
        }
        fn param_info(&self, address: ParamAddress) -> Option<ParamDescriptor> {
            (address == ParamAddress::global(3)).then_some(ParamDescriptor::new(0, 100, 0))
        }
        fn param_value(&self, _address: ParamAddress) -> i32 {
            self.raw
        }
    }

    struct Host(Producer);

    impl PluginHost for Host {
        fn plugin(&self, id: PluginId) -> Option<&dyn Plugin> {
            (id == ID).then_some(&self.0 as &dyn Plugin)
        }
        fn plugin_mut(&mut self, id: PluginId) -> Option<&mut dyn Plugin> {
            (id == ID).then_some(&mut self.0 as &mut dyn Plugin)
        }
    }

    fn host() -> Host {
        Host(Producer {
            out: ValuePort::new(PortFlow::Output, PortKind::Cv, 0.6),
            feedback: vec![0.5, -0.5, 1.0, -1.0],
            previous: vec![0.25; 4],
            raw: 25,
        })
    }

    fn run(node: Node, use_current_frame: bool, target_kind: DataType) -> Data {
        let host = host();
        let mut source =
            Source::build(node, ConnectorOpts::default(), &host.0, 4).expect("source binds");
        let mut data = Data::create(target_kind, 4);
        data.reset(4);
        source.work(&host, &mut data, 4, use_current_frame);
        data
    }

    #[test]
    fn audio_stream_adds_feedback_block() {
        let data = run(Node::audio(ID, 1), true, DataType::PortStream);
        assert_eq!(data.get_block(4), &[0.5, -0.5, 1.0, -1.0]);
    }

    #[test]
    fn audio_stream_uses_previous_block_when_not_current() {
        let data = run(Node::audio(ID, 1), false, DataType::PortStream);
        assert_eq!(data.get_block(4), &[0.25; 4]);
    }

    #[test]
    fn audio_into_param_target_is_downmixed() {
        let data = run(Node::audio(ID, 1), true, DataType::PortParam);
        assert!((data.get() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn legacy_param_is_normalized() {
        let data = run(Node::param(ID, 3), true, DataType::LegacyParam);
        assert!((data.get() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn port_stream_reads_scalar() {
        let h = host();
        let source = Source::build(Node::cv(ID, 0), ConnectorOpts::default(), &h.0, 4).unwrap();
        assert_eq!(source.kind(), DataType::PortStream);
        let data = run(Node::cv(ID, 0), true, DataType::PortParam);
        assert!((data.get() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn missing_channel_is_rejected() {
        let h = host();
        let err = Source::build(Node::audio(ID, 2), ConnectorOpts::default(), &h.0, 4);
        assert_eq!(
            err.unwrap_err(),
            RouteError::ChannelNotFound(Node::audio(ID, 2))
        );
    }

    #[test]
    fn missing_legacy_param_is_rejected() {
        let h = host();
        let node = Node::param(ID, 4);
        let err = Source::build(node, ConnectorOpts::default(), &h.0, 4);
        assert_eq!(err.unwrap_err(), RouteError::ParamNotFound(node));
    }

    #[test]
    fn unbound_source_contributes_nothing() {
        let h = host();
        let mut source =
            Source::create(DataType::PortParam, Node::cv(ID, 0), ConnectorOpts::default());
        assert!(!source.is_initialized());
        let mut data = Data::create(DataType::PortParam, 4);
        data.reset(4);
        source.work(&h, &mut data, 4, true);
        assert_eq!(data.get(), 0.0);
    }

    #[test]
    fn vanished_plugin_is_a_no_op() {
        let h = host();
        let mut source =
            Source::build(Node::cv(ID, 0), ConnectorOpts::default(), &h.0, 4).unwrap();
        struct Empty;
        impl PluginHost for Empty {
            fn plugin(&self, _: PluginId) -> Option<&dyn Plugin> {
                None
            }
            fn plugin_mut(&mut self, _: PluginId) -> Option<&mut dyn Plugin> {
                None
            }
        }
        let mut data = Data::create(DataType::PortParam, 4);
        data.reset(4);
        source.work(&Empty, &mut data, 4, true);
        assert_eq!(data.get(), 0.0);
    }
}
