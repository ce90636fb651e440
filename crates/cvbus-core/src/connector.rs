//! Link descriptions between two graph endpoints.
//!
//! A [`Connector`] is identified by its `(source, target)` pair alone. The
//! [`ConnectorOpts`] ride along with the link and are handed to every
//! [`Source`](crate::Source) and [`Target`](crate::Target) built for it, but
//! accumulation is plain summation: the options are an extension point with
//! no effect on the routed value yet.

use crate::node::Node;

/// How a link's value combines with the other links feeding the same target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ModulateMode {
    /// Sum with the other inputs.
    #[default]
    Add,
    /// Subtract from the accumulated value.
    Subtract,
    /// Multiply the accumulated value.
    Multiply,
    /// Divide the accumulated value.
    Divide,
    /// Keep the larger of the two.
    Max,
    /// Keep the smaller of the two.
    Min,
    /// Average with the other inputs.
    Average,
    /// Replace the accumulated value.
    Assign,
}

/// Per-link modulation options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectorOpts {
    /// Gain applied to the link.
    pub amp: f32,
    /// Combination rule.
    pub modulate_mode: ModulateMode,
    /// Offset applied before `amp`.
    pub offset_before: f32,
    /// Offset applied after `amp`.
    pub offset_after: f32,
}

impl Default for ConnectorOpts {
    fn default() -> Self {
        Self {
            amp: 1.0,
            modulate_mode: ModulateMode::Add,
            offset_before: 0.0,
            offset_after: 0.0,
        }
    }
}

/// A described link from one endpoint to another.
///
/// Two connectors with the same endpoints are the same connector, whatever
/// their options.
#[derive(Clone, Copy, Debug)]
pub struct Connector {
    /// Producing endpoint.
    pub source: Node,
    /// Consuming endpoint.
    pub target: Node,
    /// Link options.
    pub opts: ConnectorOpts,
}

impl Connector {
    /// Creates a connector with default options.
    pub fn new(source: Node, target: Node) -> Self {
        Self {
            source,
            target,
            opts: ConnectorOpts::default(),
        }
    }

    /// Replaces the link options.
    pub fn with_opts(mut self, opts: ConnectorOpts) -> Self {
        self.opts = opts;
        self
    }
}

impl PartialEq for Connector {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.target == other.target
    }
}

impl Eq for Connector {}

impl core::hash::Hash for Connector {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.target.hash(state);
    }
}

impl core::fmt::Display for Connector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} → {}", self.source, self.target)
    }
}
