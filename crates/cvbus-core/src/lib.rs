//! cvbus Core - control-voltage routing between plugin endpoints
//!
//! This crate moves modulation signals (CV) from producing endpoints to
//! consuming endpoints inside a plugin graph, once per audio block. It owns no
//! plugins: everything it touches is reached through the capability traits in
//! [`port`].
//!
//! # Core Abstractions
//!
//! ## Addressing
//!
//! - [`Node`] - One endpoint: plugin, port kind, kind-specific value
//! - [`Connector`] - A directed link between two nodes, with [`ConnectorOpts`]
//!
//! ## Representations
//!
//! - [`DataType`] - Four wire representations, resolved once per link
//! - [`Data`] - Per-target accumulator ([`ParamData`] scalar or [`StreamData`] window)
//! - [`Source`] / [`Target`] - Adapters bound to one producing / consuming endpoint
//!
//! ## Routing
//!
//! - [`Transporter`] - Fan-in for one target: reset, sum every source, send
//! - [`Router`] - Table of transporters, the connect/disconnect surface
//!
//! ## Port Storage
//!
//! - [`BasicRb`] - Two-block ring with dual-latency reads
//! - [`BasicBuf`] - One-block sliding window
//! - [`PortBuffer`] - Either of the above, picked by [`BufferMode`]
//!
//! ## Host Side
//!
//! - [`Port`], [`Plugin`], [`PluginHost`] - What the core needs from a host
//! - [`ValuePort`], [`StreamPort`] - Ready-made port implementations
//! - [`PatchPlugin`], [`Rack`] - A complete in-memory reference host
//!
//! # no_std Support
//!
//! The crate is `no_std` + `alloc`. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! cvbus-core = { version = "0.1", default-features = false }
//! ```
//!
//! Enable the `tracing` feature to log link resolution and routing edits at
//! `debug` level. The per-block path never logs.
//!
//! # Example
//!
//! ```rust
//! use cvbus_core::{Connector, Node, PatchPlugin, PortFlow, PortKind, Rack, Router, ValuePort};
//!
//! let mut rack = Rack::new();
//! let out = |v| ValuePort::new(PortFlow::Output, PortKind::Param, v);
//! let lfo_a = rack.insert(PatchPlugin::new().with_port(PortKind::Cv, 0, out(0.3)));
//! let lfo_b = rack.insert(PatchPlugin::new().with_port(PortKind::Cv, 0, out(0.4)));
//! let synth = rack.insert(PatchPlugin::new().with_port(
//!     PortKind::Param,
//!     5,
//!     ValuePort::new(PortFlow::Input, PortKind::Param, 0.0),
//! ));
//!
//! let mut router = Router::new(256);
//! let target = Node::param(synth, 5);
//! router.connect(&Connector::new(Node::cv(lfo_a, 0), target), &rack).unwrap();
//! router.connect(&Connector::new(Node::cv(lfo_b, 0), target), &rack).unwrap();
//!
//! // Every block: sources are summed, the target is written once.
//! router.work(&mut rack, 256, true);
//! let value = rack.get(synth).unwrap().port_value(PortKind::Param, PortFlow::Input, 5);
//! assert!((value.unwrap() - 0.7).abs() < 1e-6);
//! ```
//!
//! # Design Principles
//!
//! - **Resolve once**: endpoint lookup happens when a link is added, never per block
//! - **No allocation while rendering**: scratch space is sized at link time
//! - **Closed variant sets**: sources, targets, and data are enums, not trait objects
//! - **Recoverable edits**: bad links are returned as [`RouteError`], state untouched

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod buffer;
pub mod connector;
pub mod data;
pub mod data_type;
pub mod error;
pub mod node;
pub mod param_info;
pub mod port;
pub mod rack;
pub mod router;
pub mod source;
pub mod target;
pub mod transporter;

// Re-export main types at crate root
pub use buffer::{BasicBuf, BasicRb, BufferMode, PortBuffer};
pub use connector::{Connector, ConnectorOpts, ModulateMode};
pub use data::{Data, ParamData, StreamData};
pub use data_type::DataType;
pub use error::RouteError;
pub use node::{Node, ParamAddress, ParamGroup, PluginId, PortFlow, PortKind};
pub use param_info::{ParamDescriptor, ParamScale};
pub use port::{Plugin, PluginHost, Port, PortSlot, StreamPort, ValuePort};
pub use rack::{PatchPlugin, Rack};
pub use router::Router;
pub use source::{AudioStreamSource, LegacyParamSource, PortSource, Source};
pub use target::{AudioStreamTarget, LegacyParamTarget, PortTarget, Target};
pub use transporter::Transporter;
