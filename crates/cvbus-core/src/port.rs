//! Capabilities the routing core consumes from the plugin host.
//!
//! The core never owns plugins. It reaches them through three traits:
//!
//! - [`Port`]: one typed port: scalar and block reads/writes, kind, direction
//! - [`Plugin`]: port lookup, the per-channel audio feedback buffer, and the
//!   legacy raw-integer parameter table
//! - [`PluginHost`]: resolves a [`PluginId`] to a plugin during rendering
//!
//! Lookup ([`Plugin::find_port`], [`Plugin::param_info`]) is only called while
//! a link is being built. The per-block path addresses ports by the
//! [`PortSlot`] resolved then, so rendering does no searching.
//!
//! [`ValuePort`] and [`StreamPort`] are ready-made port implementations for
//! hosts that keep their port state in plain Rust values.

use crate::buffer::{BufferMode, PortBuffer};
use crate::node::{ParamAddress, PluginId, PortFlow, PortKind};
use crate::param_info::ParamDescriptor;

/// Position of a port in its plugin's port table, resolved once per link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PortSlot(pub usize);

/// A typed port on a plugin.
pub trait Port {
    /// Direction of the port.
    fn flow(&self) -> PortFlow;

    /// Declared kind of the port.
    fn kind(&self) -> PortKind;

    /// Current scalar value.
    fn get_value(&self) -> f32;

    /// Copies one block of samples into `dest`.
    ///
    /// `delay_frame` selects the previous block instead of the current one
    /// (see [`buffer`](crate::buffer)). Scalar ports fill `dest` with their value.
    fn get_block(&self, dest: &mut [f32], delay_frame: bool);

    /// Sets the scalar value.
    fn set_value(&mut self, value: f32);

    /// Pushes one block of samples.
    fn set_block(&mut self, src: &[f32]);
}

/// The view of one plugin the routing core needs.
///
/// Only the port methods are required; plugins without a feedback buffer or
/// legacy parameters keep the defaults.
pub trait Plugin {
    /// Finds the typed port addressed by `(kind, flow, value)`.
    ///
    /// For [`PortKind::Cv`] the value is an index into the declared CV port
    /// list; for `Param`/`Track` it is the node's parameter value.
    fn find_port(&self, kind: PortKind, flow: PortFlow, value: u32) -> Option<PortSlot>;

    /// Returns the port at a resolved slot.
    fn port(&self, slot: PortSlot) -> Option<&dyn Port>;

    /// Returns the port at a resolved slot, mutably.
    fn port_mut(&mut self, slot: PortSlot) -> Option<&mut dyn Port>;

    /// Number of channels in the audio feedback buffer.
    fn feedback_channels(&self) -> usize {
        0
    }

    /// Copies one block of the previous output of `channel` into `dest`.
    ///
    /// Returns `false` if the channel does not exist.
    fn read_feedback(&self, _channel: usize, _dest: &mut [f32], _delay_frame: bool) -> bool {
        false
    }

    /// Describes a raw-integer parameter, or `None` if it does not exist.
    fn param_info(&self, _address: ParamAddress) -> Option<ParamDescriptor> {
        None
    }

    /// Current raw value of a parameter.
    fn param_value(&self, _address: ParamAddress) -> i32 {
        0
    }

    /// Writes a raw parameter value directly, bypassing any host undo/recording.
    fn set_param_direct(&mut self, _address: ParamAddress, _value: i32) {}
}

/// Resolves plugins by ID.
pub trait PluginHost {
    /// Returns the plugin with this ID.
    fn plugin(&self, id: PluginId) -> Option<&dyn Plugin>;

    /// Returns the plugin with this ID, mutably.
    fn plugin_mut(&mut self, id: PluginId) -> Option<&mut dyn Plugin>;
}

/// Scalar port holding a single value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuePort {
    flow: PortFlow,
    kind: PortKind,
    value: f32,
}

impl ValuePort {
    /// Creates a port with an initial value.
    pub fn new(flow: PortFlow, kind: PortKind, value: f32) -> Self {
        Self { flow, kind, value }
    }

    /// Returns the held value.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }
}

impl Port for ValuePort {
    fn flow(&self) -> PortFlow {
        self.flow
    }

    fn kind(&self) -> PortKind {
        self.kind
    }

    fn get_value(&self) -> f32 {
        self.value
    }

    fn get_block(&self, dest: &mut [f32], _delay_frame: bool) {
        dest.fill(self.value);
    }

    fn set_value(&mut self, value: f32) {
        self.value = value;
    }

    fn set_block(&mut self, src: &[f32]) {
        if let Some(&last) = src.last() {
            self.value = last;
        }
    }
}

/// Block-rate port backed by a [`PortBuffer`].
///
/// Block reads honour the delay flag when the buffer is a ring. A scalar
/// write holds the value for one full block.
#[derive(Debug, Clone)]
pub struct StreamPort {
    flow: PortFlow,
    kind: PortKind,
    buffer: PortBuffer,
}

impl StreamPort {
    /// Creates a zeroed port.
    ///
    /// # Panics
    ///
    /// Panics in [`BufferMode::Ring`] if `block_size` is not a power of two.
    pub fn new(flow: PortFlow, kind: PortKind, mode: BufferMode, block_size: usize) -> Self {
        Self {
            flow,
            kind,
            buffer: PortBuffer::new(mode, block_size),
        }
    }

    /// Returns the backing storage.
    pub fn buffer(&self) -> &PortBuffer {
        &self.buffer
    }

    /// Returns the backing storage, mutably.
    pub fn buffer_mut(&mut self) -> &mut PortBuffer {
        &mut self.buffer
    }
}

impl Port for StreamPort {
    fn flow(&self) -> PortFlow {
        self.flow
    }

    fn kind(&self) -> PortKind {
        self.kind
    }

    fn get_value(&self) -> f32 {
        self.buffer.latest()
    }

    fn get_block(&self, dest: &mut [f32], delay_frame: bool) {
        self.buffer.read(dest, delay_frame);
    }

    fn set_value(&mut self, value: f32) {
        // Hold the value across a whole block without allocating.
        const CHUNK: usize = 64;
        let chunk = [value; CHUNK];
        let mut remaining = self.buffer.block_size();
        while remaining > 0 {
            let n = remaining.min(CHUNK);
            self.buffer.write(&chunk[..n]);
            remaining -= n;
        }
    }

    fn set_block(&mut self, src: &[f32]) {
        self.buffer.write(src);
    }
}
