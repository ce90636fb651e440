//! Per-target aggregation unit.
//!
//! A [`Transporter`] serves one target [`Node`]. It owns the target's
//! [`Data`] accumulator and [`Target`] adapter, plus the ordered list of
//! [`Source`]s feeding it, one per inbound [`Connector`].
//!
//! # States
//!
//! - **Unbound**: no sources, no target, no data. [`work`](Transporter::work)
//!   is a no-op.
//! - **Bound**: at least one source; target and data exist.
//!
//! The first successful [`add_source`](Transporter::add_source) binds the
//! transporter; removing the last source drops the target and data together
//! and returns it to Unbound.
//!
//! A connector whose endpoints do not resolve (unknown channel, parameter,
//! or port) is rejected with a [`RouteError`] and never reaches the block
//! cycle. Malformed nodes are not fatal.
//!
//! # Block cycle
//!
//! ```text
//! data.reset(n) → source[0].work … source[k].work → target.send
//! ```
//!
//! Sources are lent `&mut Data` one after another and the target reads it
//! last, so the cycle can never interleave with itself.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::connector::Connector;
use crate::data::Data;
use crate::data_type::DataType;
use crate::error::RouteError;
use crate::node::Node;
use crate::port::{Plugin, PluginHost};
use crate::source::Source;
use crate::target::Target;

/// Target adapter and accumulator, present only while bound.
#[derive(Debug, Clone)]
struct Binding {
    target: Target,
    data: Data,
}

/// Aggregates every link into one target node.
#[derive(Debug, Clone)]
pub struct Transporter {
    target_node: Node,
    block_size: usize,
    binding: Option<Binding>,
    sources: Vec<Source>,
}

impl Transporter {
    /// Creates an unbound transporter for `target_node`.
    pub fn new(target_node: Node, block_size: usize) -> Self {
        Self {
            target_node,
            block_size,
            binding: None,
            sources: Vec::new(),
        }
    }

    /// Adds the source side of `connector`, binding the target on first use.
    ///
    /// `from` is the producing plugin, `to` the consuming one. Either both the
    /// source and (when unbound) the target resolve, or nothing changes.
    ///
    /// # Errors
    ///
    /// - [`RouteError::TargetMismatch`] if the connector feeds another node
    /// - [`RouteError::DuplicateConnector`] if the source is already present
    /// - any resolution error from the source or target endpoint
    pub fn add_source(
        &mut self,
        connector: &Connector,
        from: &dyn Plugin,
        to: &dyn Plugin,
    ) -> Result<(), RouteError> {
        if connector.target != self.target_node {
            return Err(RouteError::TargetMismatch {
                expected: self.target_node,
                found: connector.target,
            });
        }
        if self.position(connector.source).is_some() {
            return Err(RouteError::DuplicateConnector {
                source: connector.source,
                target: connector.target,
            });
        }

        let binding = match self.binding {
            Some(_) => None,
            None => {
                let target = Target::build(connector.target, connector.opts, to)?;
                let data = Data::create(target.kind(), self.block_size);
                Some(Binding { target, data })
            }
        };
        let source = Source::build(connector.source, connector.opts, from, self.block_size)?;

        if let Some(binding) = binding {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                "transporter_bind: {} as {:?}",
                self.target_node,
                binding.target.kind()
            );
            self.binding = Some(binding);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "transporter_add: {} ({:?}) → {}",
            connector.source,
            source.kind(),
            self.target_node
        );
        self.sources.push(source);
        Ok(())
    }

    /// Removes the source side of `connector`.
    ///
    /// Returns `false` if no source matches. Removing the last source drops
    /// the target and data.
    pub fn remove_source(&mut self, connector: &Connector) -> bool {
        if connector.target != self.target_node {
            return false;
        }
        let Some(index) = self.position(connector.source) else {
            return false;
        };
        self.sources.remove(index);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "transporter_remove: {} → {}",
            connector.source,
            self.target_node
        );
        self.unbind_if_empty();
        true
    }

    /// Removes every source owned by `plugin`. Returns how many were removed.
    pub fn remove_sources_from(&mut self, plugin: crate::node::PluginId) -> usize {
        let before = self.sources.len();
        self.sources.retain(|s| s.node().plugin_id != plugin);
        let removed = before - self.sources.len();
        self.unbind_if_empty();
        removed
    }

    /// Moves the source at position `from` to position `to`.
    ///
    /// Presentation order only; the summed result does not change.
    pub fn move_source(&mut self, from: usize, to: usize) -> Result<(), RouteError> {
        let len = self.sources.len();
        for index in [from, to] {
            if index >= len {
                return Err(RouteError::IndexOutOfRange { index, len });
            }
        }
        let source = self.sources.remove(from);
        self.sources.insert(to, source);
        Ok(())
    }

    /// Returns the position of the source side of `connector`.
    pub fn get_index(&self, connector: &Connector) -> Option<usize> {
        if connector.target != self.target_node {
            return None;
        }
        self.position(connector.source)
    }

    /// Runs one block: reset, every source in order, then the target.
    ///
    /// No-op while unbound.
    #[inline]
    pub fn work(&mut self, host: &mut dyn PluginHost, n: usize, use_current_frame: bool) {
        let Some(binding) = self.binding.as_mut() else {
            return;
        };
        binding.data.reset(n);
        for source in &mut self.sources {
            source.work(&*host, &mut binding.data, n, use_current_frame);
        }
        binding.target.send(host, &binding.data, n);
    }

    /// Returns the target node this transporter serves.
    pub fn target_node(&self) -> Node {
        self.target_node
    }

    /// Returns the block size used for data and scratch buffers.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns true while a target and data exist.
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Returns the accumulator of the last block, if bound.
    pub fn data(&self) -> Option<&Data> {
        self.binding.as_ref().map(|b| &b.data)
    }

    /// Returns the representation of the target, if bound.
    pub fn data_type(&self) -> Option<DataType> {
        self.binding.as_ref().map(|b| b.target.kind())
    }

    /// Returns the target adapter, if bound.
    pub fn target(&self) -> Option<&Target> {
        self.binding.as_ref().map(|b| &b.target)
    }

    /// Returns the number of sources.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Returns the sources in processing order.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Reconstructs the connectors feeding this transporter, in source order.
    pub fn connectors(&self) -> impl Iterator<Item = Connector> + '_ {
        self.sources.iter().map(move |s| Connector {
            source: s.node(),
            target: self.target_node,
            opts: s.opts(),
        })
    }

    fn position(&self, source: Node) -> Option<usize> {
        self.sources.iter().position(|s| s.node() == source)
    }

    fn unbind_if_empty(&mut self) {
        if self.sources.is_empty() && self.binding.take().is_some() {
            #[cfg(feature = "tracing")]
            tracing::debug!("transporter_unbind: {}", self.target_node);
        }
    }
}
