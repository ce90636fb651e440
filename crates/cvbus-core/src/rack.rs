//! Reference host: plain-Rust plugins and a plugin table.
//!
//! [`PatchPlugin`] is a [`Plugin`] assembled from boxed [`Port`]s, an optional
//! per-channel audio feedback buffer, and a table of legacy raw-integer
//! parameters. [`Rack`] holds patch plugins by [`PluginId`] and implements
//! [`PluginHost`], so a [`Router`](crate::Router) can run against it directly.
//!
//! Hosts with their own plugin model implement the traits in
//! [`port`](crate::port) instead; nothing in the routing core depends on this
//! module.
//!
//! ```rust
//! use cvbus_core::{Connector, Node, PatchPlugin, PortFlow, PortKind, Rack, Router, ValuePort};
//!
//! let mut rack = Rack::new();
//! let lfo = rack.insert(PatchPlugin::new().with_port(
//!     PortKind::Cv,
//!     0,
//!     ValuePort::new(PortFlow::Output, PortKind::Param, 0.5),
//! ));
//! let filter = rack.insert(PatchPlugin::new().with_port(
//!     PortKind::Param,
//!     3,
//!     ValuePort::new(PortFlow::Input, PortKind::Param, 0.0),
//! ));
//!
//! let mut router = Router::new(64);
//! router
//!     .connect(&Connector::new(Node::cv(lfo, 0), Node::param(filter, 3)), &rack)
//!     .unwrap();
//! router.work(&mut rack, 64, true);
//! let cutoff = rack.get(filter).unwrap().port_value(PortKind::Param, PortFlow::Input, 3);
//! assert_eq!(cutoff, Some(0.5));
//! ```

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::buffer::{BufferMode, PortBuffer};
use crate::node::{ParamAddress, PluginId, PortFlow, PortKind};
use crate::param_info::ParamDescriptor;
use crate::port::{Plugin, PluginHost, Port, PortSlot};

/// One port of a [`PatchPlugin`], keyed by the node address that reaches it.
struct PatchPort {
    address_kind: PortKind,
    index: u32,
    port: Box<dyn Port + Send>,
}

/// One legacy parameter of a [`PatchPlugin`].
#[derive(Debug, Clone, Copy)]
struct LegacyParam {
    address: ParamAddress,
    descriptor: ParamDescriptor,
    value: i32,
}

/// A [`Plugin`] assembled from parts.
#[derive(Default)]
pub struct PatchPlugin {
    ports: Vec<PatchPort>,
    feedback: Vec<PortBuffer>,
    params: Vec<LegacyParam>,
}

impl core::fmt::Debug for PatchPlugin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PatchPlugin")
            .field("ports", &self.ports.len())
            .field("feedback_channels", &self.feedback.len())
            .field("params", &self.params)
            .finish()
    }
}

impl PatchPlugin {
    /// Creates a plugin with no ports, feedback, or parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a port reachable as `address_kind[index]` and returns its slot.
    ///
    /// `address_kind` is how nodes address the port (`Param`, `Track`, `Cv`);
    /// the port's own [`Port::kind`] is its declared kind.
    pub fn add_port(
        &mut self,
        address_kind: PortKind,
        index: u32,
        port: impl Port + Send + 'static,
    ) -> PortSlot {
        self.ports.push(PatchPort {
            address_kind,
            index,
            port: Box::new(port),
        });
        PortSlot(self.ports.len() - 1)
    }

    /// Builder form of [`add_port`](Self::add_port).
    #[must_use]
    pub fn with_port(
        mut self,
        address_kind: PortKind,
        index: u32,
        port: impl Port + Send + 'static,
    ) -> Self {
        self.add_port(address_kind, index, port);
        self
    }

    /// Adds `channels` feedback buffers of the given mode and block size.
    ///
    /// # Panics
    ///
    /// Panics in [`BufferMode::Ring`] if `block_size` is not a power of two.
    #[must_use]
    pub fn with_feedback(mut self, channels: usize, mode: BufferMode, block_size: usize) -> Self {
        self.feedback
            .extend((0..channels).map(|_| PortBuffer::new(mode, block_size)));
        self
    }

    /// Adds a legacy parameter at its default value.
    #[must_use]
    pub fn with_param(mut self, address: ParamAddress, descriptor: ParamDescriptor) -> Self {
        self.params.push(LegacyParam {
            address,
            descriptor,
            value: descriptor.default,
        });
        self
    }

    /// Writes one block of output into feedback channel `channel` (0-based).
    ///
    /// Returns `false` if the channel does not exist.
    pub fn write_feedback(&mut self, channel: usize, block: &[f32]) -> bool {
        match self.feedback.get_mut(channel) {
            Some(buffer) => {
                buffer.write(block);
                true
            }
            None => false,
        }
    }

    /// Sets a legacy parameter, clamped to its range.
    ///
    /// Returns `false` if the parameter does not exist.
    pub fn set_param(&mut self, address: ParamAddress, value: i32) -> bool {
        match self.params.iter_mut().find(|p| p.address == address) {
            Some(p) => {
                p.value = p.descriptor.clamp(value);
                true
            }
            None => false,
        }
    }

    /// Returns the raw value of a legacy parameter.
    pub fn param(&self, address: ParamAddress) -> Option<i32> {
        self.params
            .iter()
            .find(|p| p.address == address)
            .map(|p| p.value)
    }

    /// Returns the scalar value of the port addressed by `(kind, flow, index)`.
    pub fn port_value(&self, kind: PortKind, flow: PortFlow, index: u32) -> Option<f32> {
        let slot = self.find_port(kind, flow, index)?;
        self.port(slot).map(|p| p.get_value())
    }

    /// Sets the scalar value of the port addressed by `(kind, flow, index)`.
    ///
    /// Returns `false` if no such port exists.
    pub fn set_port_value(
        &mut self,
        kind: PortKind,
        flow: PortFlow,
        index: u32,
        value: f32,
    ) -> bool {
        let Some(slot) = self.find_port(kind, flow, index) else {
            return false;
        };
        match self.port_mut(slot) {
            Some(port) => {
                port.set_value(value);
                true
            }
            None => false,
        }
    }

    /// Returns the number of ports.
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }
}

impl Plugin for PatchPlugin {
    fn find_port(&self, kind: PortKind, flow: PortFlow, value: u32) -> Option<PortSlot> {
        self.ports
            .iter()
            .position(|p| p.address_kind == kind && p.index == value && p.port.flow() == flow)
            .map(PortSlot)
    }

    fn port(&self, slot: PortSlot) -> Option<&dyn Port> {
        self.ports.get(slot.0).map(|p| &*p.port as &dyn Port)
    }

    fn port_mut(&mut self, slot: PortSlot) -> Option<&mut dyn Port> {
        self.ports.get_mut(slot.0).map(|p| &mut *p.port as &mut dyn Port)
    }

    fn feedback_channels(&self) -> usize {
        self.feedback.len()
    }

    fn read_feedback(&self, channel: usize, dest: &mut [f32], delay_frame: bool) -> bool {
        match self.feedback.get(channel) {
            Some(buffer) => {
                buffer.read(dest, delay_frame);
                true
            }
            None => false,
        }
    }

    fn param_info(&self, address: ParamAddress) -> Option<ParamDescriptor> {
        self.params
            .iter()
            .find(|p| p.address == address)
            .map(|p| p.descriptor)
    }

    fn param_value(&self, address: ParamAddress) -> i32 {
        self.param(address).unwrap_or(0)
    }

    fn set_param_direct(&mut self, address: ParamAddress, value: i32) {
        self.set_param(address, value);
    }
}

/// Table of [`PatchPlugin`]s addressed by [`PluginId`].
#[derive(Debug, Default)]
pub struct Rack {
    plugins: Vec<(PluginId, PatchPlugin)>,
    next_id: u32,
}

impl Rack {
    /// Creates an empty rack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plugin and returns its newly assigned ID.
    ///
    /// IDs are never reused.
    pub fn insert(&mut self, plugin: PatchPlugin) -> PluginId {
        let id = PluginId(self.next_id);
        self.next_id += 1;
        self.plugins.push((id, plugin));
        id
    }

    /// Removes a plugin. Links touching it must be removed from the router
    /// separately ([`Router::remove_plugin`](crate::Router::remove_plugin)).
    pub fn remove(&mut self, id: PluginId) -> Option<PatchPlugin> {
        let index = self.plugins.iter().position(|(i, _)| *i == id)?;
        Some(self.plugins.remove(index).1)
    }

    /// Returns a plugin.
    pub fn get(&self, id: PluginId) -> Option<&PatchPlugin> {
        self.plugins.iter().find(|(i, _)| *i == id).map(|(_, p)| p)
    }

    /// Returns a plugin, mutably.
    pub fn get_mut(&mut self, id: PluginId) -> Option<&mut PatchPlugin> {
        self.plugins
            .iter_mut()
            .find(|(i, _)| *i == id)
            .map(|(_, p)| p)
    }

    /// Returns the IDs of all plugins, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = PluginId> + '_ {
        self.plugins.iter().map(|(id, _)| *id)
    }

    /// Returns the number of plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if the rack holds no plugins.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl PluginHost for Rack {
    fn plugin(&self, id: PluginId) -> Option<&dyn Plugin> {
        self.get(id).map(|p| p as &dyn Plugin)
    }

    fn plugin_mut(&mut self, id: PluginId) -> Option<&mut dyn Plugin> {
        self.get_mut(id).map(|p| p as &mut dyn Plugin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{StreamPort, ValuePort};

    #[test]
    fn find_port_matches_address_and_flow() {
        let plugin = PatchPlugin::new()
            .with_port(
                PortKind::Cv,
                0,
                ValuePort::new(PortFlow::Output, PortKind::Param, 0.1),
            )
            .with_port(
                PortKind::Cv,
                0,
                StreamPort::new(PortFlow::Input, PortKind::Cv, BufferMode::Ring, 8),
            );
        assert_eq!(
            plugin.find_port(PortKind::Cv, PortFlow::Output, 0),
            Some(PortSlot(0))
        );
        assert_eq!(
            plugin.find_port(PortKind::Cv, PortFlow::Input, 0),
            Some(PortSlot(1))
        );
        assert_eq!(plugin.find_port(PortKind::Param, PortFlow::Output, 0), None);
        assert_eq!(plugin.port_count(), 2);
    }

    #[test]
    fn port_value_helpers() {
        let mut plugin = PatchPlugin::new().with_port(
            PortKind::Param,
            4,
            ValuePort::new(PortFlow::Input, PortKind::Param, 0.0),
        );
        assert!(plugin.set_port_value(PortKind::Param, PortFlow::Input, 4, 0.6));
        assert_eq!(
            plugin.port_value(PortKind::Param, PortFlow::Input, 4),
            Some(0.6)
        );
        assert!(!plugin.set_port_value(PortKind::Param, PortFlow::Input, 5, 0.6));
    }

    #[test]
    fn legacy_params_clamp() {
        let address = ParamAddress::global(2);
        let mut plugin =
            PatchPlugin::new().with_param(address, ParamDescriptor::new(0, 100, 40));
        assert_eq!(plugin.param(address), Some(40));
        assert!(plugin.set_param(address, 500));
        assert_eq!(plugin.param(address), Some(100));
        assert!(!plugin.set_param(ParamAddress::global(3), 1));
        assert_eq!(plugin.param_value(ParamAddress::global(3)), 0);
    }

    #[test]
    fn feedback_reads_follow_delay_flag() {
        let mut plugin = PatchPlugin::new().with_feedback(2, BufferMode::Ring, 4);
        assert_eq!(plugin.feedback_channels(), 2);
        assert!(plugin.write_feedback(1, &[1.0; 4]));
        assert!(plugin.write_feedback(1, &[2.0; 4]));
        assert!(!plugin.write_feedback(2, &[0.0; 4]));
        let mut out = [0.0; 4];
        assert!(plugin.read_feedback(1, &mut out, false));
        assert_eq!(out, [2.0; 4]);
        assert!(plugin.read_feedback(1, &mut out, true));
        assert_eq!(out, [1.0; 4]);
        assert!(!plugin.read_feedback(5, &mut out, false));
    }

    #[test]
    fn rack_ids_are_not_reused() {
        let mut rack = Rack::new();
        let a = rack.insert(PatchPlugin::new());
        let b = rack.insert(PatchPlugin::new());
        assert!(rack.remove(a).is_some());
        let c = rack.insert(PatchPlugin::new());
        assert_ne!(a, c);
        assert_ne!(b, c);
        assert!(rack.plugin(a).is_none());
        assert!(rack.plugin_mut(c).is_some());
        assert_eq!(rack.ids().collect::<Vec<_>>(), [b, c]);
        assert_eq!(rack.len(), 2);
    }
}
