//! Block-boundary handoff of routing edits to the audio thread.
//!
//! A [`Router`](cvbus_core::Router) is not shared between threads. The audio
//! thread owns it inside a [`RouterProcessor`]; control threads hold a
//! [`RouterHandle`] and send it [`RouteCommand`]s. Queued commands are applied
//! at the start of the next block, so an edit never lands while a transporter
//! is mid-cycle. Each applied command is answered with a [`RouteEvent`].
//!
//! ```rust
//! use cvbus_core::{Connector, Node, PatchPlugin, PortFlow, PortKind, Rack, Router, ValuePort};
//! use cvbus_engine::{RouteEvent, channel};
//!
//! let mut rack = Rack::new();
//! let lfo = rack.insert(PatchPlugin::new().with_port(
//!     PortKind::Cv,
//!     0,
//!     ValuePort::new(PortFlow::Output, PortKind::Param, 0.5),
//! ));
//! let synth = rack.insert(PatchPlugin::new().with_port(
//!     PortKind::Param,
//!     0,
//!     ValuePort::new(PortFlow::Input, PortKind::Param, 0.0),
//! ));
//!
//! let (handle, mut processor) = channel(Router::new(128), 64);
//! handle
//!     .connect(Connector::new(Node::cv(lfo, 0), Node::param(synth, 0)))
//!     .unwrap();
//!
//! // Audio thread, once per block:
//! processor.process_block(&mut rack, 128, true);
//!
//! assert!(handle.try_event().is_some_and(|e| e.is_applied()));
//! ```

mod command;
mod error;
mod handoff;

pub use command::{RouteCommand, RouteEvent};
pub use error::EngineError;
pub use handoff::{RouterHandle, RouterProcessor, channel};
