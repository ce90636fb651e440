//! Routing table: one [`Transporter`] per target node.
//!
//! The [`Router`] is the edit surface of the core. [`connect`](Router::connect)
//! and [`disconnect`](Router::disconnect) route a [`Connector`] to the
//! transporter serving its target, creating it on first use and dropping it
//! once its last source is gone. [`work`](Router::work) runs every
//! transporter for one block in table order.
//!
//! Edits allocate and may log; call them off the audio thread, or at a block
//! boundary through the engine command queue.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::connector::Connector;
use crate::error::RouteError;
use crate::node::{Node, PluginId};
use crate::port::PluginHost;
use crate::transporter::Transporter;

/// Set of transporters keyed by target node, in creation order.
#[derive(Debug, Clone)]
pub struct Router {
    block_size: usize,
    transporters: Vec<Transporter>,
}

impl Router {
    /// Creates an empty router for blocks of up to `block_size` samples.
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            transporters: Vec::new(),
        }
    }

    /// Returns the maximum block size.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Adds a link, resolving both endpoints against `host`.
    ///
    /// # Errors
    ///
    /// - [`RouteError::PluginNotFound`] if either plugin is unknown
    /// - any [`Transporter::add_source`] error
    ///
    /// On error the table is unchanged.
    pub fn connect(
        &mut self,
        connector: &Connector,
        host: &dyn PluginHost,
    ) -> Result<(), RouteError> {
        let from = host
            .plugin(connector.source.plugin_id)
            .ok_or(RouteError::PluginNotFound(connector.source.plugin_id))?;
        let to = host
            .plugin(connector.target.plugin_id)
            .ok_or(RouteError::PluginNotFound(connector.target.plugin_id))?;

        if let Some(t) = self.find_mut(connector.target) {
            return t.add_source(connector, from, to);
        }
        let mut transporter = Transporter::new(connector.target, self.block_size);
        transporter.add_source(connector, from, to)?;
        self.transporters.push(transporter);
        #[cfg(feature = "tracing")]
        tracing::debug!("router_connect: {connector}");
        Ok(())
    }

    /// Removes a link. Returns `false` if it was not present.
    pub fn disconnect(&mut self, connector: &Connector) -> bool {
        let Some(index) = self.position(connector.target) else {
            return false;
        };
        let removed = self.transporters[index].remove_source(connector);
        if removed {
            #[cfg(feature = "tracing")]
            tracing::debug!("router_disconnect: {connector}");
        }
        self.drop_if_unbound(index);
        removed
    }

    /// Reorders the sources feeding `target`.
    ///
    /// # Errors
    ///
    /// [`RouteError::UnknownTarget`] if nothing feeds `target`, or
    /// [`RouteError::IndexOutOfRange`] from the transporter.
    pub fn move_source(&mut self, target: Node, from: usize, to: usize) -> Result<(), RouteError> {
        self.find_mut(target)
            .ok_or(RouteError::UnknownTarget(target))?
            .move_source(from, to)
    }

    /// Returns the position of `connector` among its target's sources.
    pub fn get_index(&self, connector: &Connector) -> Option<usize> {
        self.transporter(connector.target)?.get_index(connector)
    }

    /// Returns true if `connector` is present.
    pub fn contains(&self, connector: &Connector) -> bool {
        self.get_index(connector).is_some()
    }

    /// Returns the transporter serving `target`.
    pub fn transporter(&self, target: Node) -> Option<&Transporter> {
        self.transporters.iter().find(|t| t.target_node() == target)
    }

    /// Returns the connectors feeding `target`, in source order.
    pub fn connectors_into(&self, target: Node) -> impl Iterator<Item = Connector> + '_ {
        self.transporter(target)
            .into_iter()
            .flat_map(Transporter::connectors)
    }

    /// Returns every connector, grouped by target.
    pub fn connectors(&self) -> impl Iterator<Item = Connector> + '_ {
        self.transporters.iter().flat_map(Transporter::connectors)
    }

    /// Removes every link touching `plugin`, as source or target.
    ///
    /// Returns how many links were removed.
    pub fn remove_plugin(&mut self, plugin: PluginId) -> usize {
        let mut removed = 0;
        self.transporters.retain_mut(|t| {
            if t.target_node().plugin_id == plugin {
                removed += t.source_count();
                return false;
            }
            removed += t.remove_sources_from(plugin);
            t.is_bound()
        });
        #[cfg(feature = "tracing")]
        if removed > 0 {
            tracing::debug!("router_remove_plugin: {plugin} ({removed} links)");
        }
        removed
    }

    /// Removes every link.
    pub fn clear(&mut self) {
        self.transporters.clear();
    }

    /// Runs every transporter for one block of `n` samples.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the block size.
    #[inline]
    pub fn work(&mut self, host: &mut dyn PluginHost, n: usize, use_current_frame: bool) {
        for transporter in &mut self.transporters {
            transporter.work(host, n, use_current_frame);
        }
    }

    /// Runs only the transporter serving `target`. Returns `false` if none does.
    ///
    /// Lets a host interleave transporter work with its own plugin order.
    #[inline]
    pub fn work_into(
        &mut self,
        target: Node,
        host: &mut dyn PluginHost,
        n: usize,
        use_current_frame: bool,
    ) -> bool {
        match self.find_mut(target) {
            Some(t) => {
                t.work(host, n, use_current_frame);
                true
            }
            None => false,
        }
    }

    /// Returns the number of transporters (distinct targets).
    pub fn len(&self) -> usize {
        self.transporters.len()
    }

    /// Returns true if no link exists.
    pub fn is_empty(&self) -> bool {
        self.transporters.is_empty()
    }

    /// Returns the transporters in processing order.
    pub fn transporters(&self) -> &[Transporter] {
        &self.transporters
    }

    fn position(&self, target: Node) -> Option<usize> {
        self.transporters.iter().position(|t| t.target_node() == target)
    }

    fn find_mut(&mut self, target: Node) -> Option<&mut Transporter> {
        self.transporters.iter_mut().find(|t| t.target_node() == target)
    }

    fn drop_if_unbound(&mut self, index: usize) {
        if !self.transporters[index].is_bound() {
            self.transporters.remove(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{PortFlow, PortKind};
    use crate::port::{Plugin, Port, PortSlot, ValuePort};

    /// Plugin with `n` cv outputs and `n` param inputs, all scalar.
    struct Fixture {
        outs: Vec<ValuePort>,
        ins: Vec<ValuePort>,
    }

    impl Fixture {
        fn new(outs: &[f32]) -> Self {
            Self {
                outs: outs
                    .iter()
                    .map(|&v| ValuePort::new(PortFlow::Output, PortKind::Param, v))
                    .collect(),
                ins: outs
                    .iter()
                    .map(|_| ValuePort::new(PortFlow::Input, PortKind::Param, 0.0))
                    .collect(),
            }
        }
    }

    impl Plugin for Fixture {
        fn find_port(&self, kind: PortKind, flow: PortFlow, value: u32) -> Option<PortSlot> {
            let len = self.outs.len();
            let index = value as usize;
            match (kind, flow) {
                (PortKind::Cv, PortFlow::Output) if index < len => Some(PortSlot(index)),
                (PortKind::Param, PortFlow::Input) if index < len => Some(PortSlot(len + index)),
                _ => None,
            }
        }
        fn port(&self, slot: PortSlot) -> Option<&dyn Port> {
            let len = self.outs.len();
            if slot.0 < len {
                Some(&self.outs[slot.0])
            } else {
                self.ins.get(slot.0 - len).map(|p| p as &dyn Port)
            }
        }
        fn port_mut(&mut self, slot: PortSlot) -> Option<&mut dyn Port> {
            let len = self.outs.len();
            if slot.0 < len {
                Some(&mut self.outs[slot.0])
            } else {
                self.ins.get_mut(slot.0 - len).map(|p| p as &mut dyn Port)
            }
        }
    }

    struct Host(Vec<Fixture>);

    impl PluginHost for Host {
        fn plugin(&self, id: PluginId) -> Option<&dyn Plugin> {
            self.0.get(id.index() as usize).map(|p| p as &dyn Plugin)
        }
        fn plugin_mut(&mut self, id: PluginId) -> Option<&mut dyn Plugin> {
            self.0.get_mut(id.index() as usize).map(|p| p as &mut dyn Plugin)
        }
    }

    fn link(from: u32, port: u32, to: u32, param: u32) -> Connector {
        Connector::new(
            Node::cv(PluginId(from), port),
            Node::param(PluginId(to), param),
        )
    }

    fn host() -> Host {
        Host(vec![Fixture::new(&[0.25, 0.5]), Fixture::new(&[0.1, 0.2])])
    }

    #[test]
    fn connect_creates_one_transporter_per_target() {
        let h = host();
        let mut router = Router::new(64);
        router.connect(&link(0, 0, 1, 0), &h).unwrap();
        router.connect(&link(0, 1, 1, 0), &h).unwrap();
        router.connect(&link(1, 0, 0, 1), &h).unwrap();
        assert_eq!(router.len(), 2);
        assert_eq!(router.connectors().count(), 3);
        assert_eq!(router.connectors_into(Node::param(PluginId(1), 0)).count(), 2);
    }

    #[test]
    fn work_delivers_sums() {
        let mut h = host();
        let mut router = Router::new(64);
        router.connect(&link(0, 0, 1, 0), &h).unwrap();
        router.connect(&link(0, 1, 1, 0), &h).unwrap();
        router.work(&mut h, 64, true);
        assert!((h.0[1].ins[0].value() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn unknown_plugin_is_rejected() {
        let h = host();
        let mut router = Router::new(64);
        assert_eq!(
            router.connect(&link(5, 0, 1, 0), &h),
            Err(RouteError::PluginNotFound(PluginId(5)))
        );
        assert!(router.is_empty());
    }

    #[test]
    fn failed_first_connect_adds_no_transporter() {
        let h = host();
        let mut router = Router::new(64);
        assert!(router.connect(&link(0, 9, 1, 0), &h).is_err());
        assert!(router.is_empty());
    }

    #[test]
    fn disconnect_drops_empty_transporter() {
        let h = host();
        let mut router = Router::new(64);
        let c = link(0, 0, 1, 0);
        router.connect(&c, &h).unwrap();
        assert!(router.contains(&c));
        assert!(router.disconnect(&c));
        assert!(router.is_empty());
        assert!(!router.disconnect(&c));
    }

    #[test]
    fn move_source_on_unknown_target() {
        let mut router = Router::new(64);
        let target = Node::param(PluginId(0), 0);
        assert_eq!(
            router.move_source(target, 0, 1),
            Err(RouteError::UnknownTarget(target))
        );
    }

    #[test]
    fn remove_plugin_drops_links_both_ways() {
        let h = host();
        let mut router = Router::new(64);
        router.connect(&link(0, 0, 1, 0), &h).unwrap();
        router.connect(&link(1, 0, 1, 1), &h).unwrap();
        router.connect(&link(1, 1, 0, 0), &h).unwrap();
        router.connect(&link(0, 1, 0, 1), &h).unwrap();
        assert_eq!(router.remove_plugin(PluginId(1)), 3);
        assert_eq!(router.len(), 1);
        assert!(router.contains(&link(0, 1, 0, 1)));
    }

    #[test]
    fn work_into_runs_one_target() {
        let mut h = host();
        let mut router = Router::new(64);
        router.connect(&link(0, 0, 1, 0), &h).unwrap();
        router.connect(&link(0, 1, 1, 1), &h).unwrap();
        assert!(router.work_into(Node::param(PluginId(1), 1), &mut h, 64, true));
        assert_eq!(h.0[1].ins[0].value(), 0.0);
        assert!((h.0[1].ins[1].value() - 0.5).abs() < 1e-6);
        assert!(!router.work_into(Node::param(PluginId(0), 0), &mut h, 64, true));
    }
}
