//! Control-thread handle and audio-thread processor.
//!
//! ```text
//!  control thread                     audio thread
//! ┌──────────────┐  RouteCommand   ┌──────────────────┐
//! │ RouterHandle │ ──────────────► │ RouterProcessor  │
//! │              │ ◄────────────── │  (owns Router)   │
//! └──────────────┘   RouteEvent    └──────────────────┘
//! ```
//!
//! Both queues are bounded. The handle never blocks: a full command queue is
//! reported as [`EngineError::QueueFull`]. The processor never blocks either:
//! if the control thread stops draining events, surplus events are counted
//! and dropped.

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};
use cvbus_core::{Connector, Node, PluginHost, PluginId, RouteError, Router};

use crate::{EngineError, RouteCommand, RouteEvent};

/// Creates a connected handle/processor pair around `router`.
///
/// `capacity` bounds both the command and the event queue.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn channel(router: Router, capacity: usize) -> (RouterHandle, RouterProcessor) {
    assert!(capacity > 0, "queue capacity must be non-zero");
    let (command_tx, command_rx) = bounded(capacity);
    let (event_tx, event_rx) = bounded(capacity);
    (
        RouterHandle {
            commands: command_tx,
            events: event_rx,
        },
        RouterProcessor {
            router,
            commands: command_rx,
            events: event_tx,
            dropped_events: 0,
            disconnected: false,
        },
    )
}

/// Control-thread side: queues edits, collects outcomes.
///
/// Cheap to clone; every clone feeds the same processor.
#[derive(Debug, Clone)]
pub struct RouterHandle {
    commands: Sender<RouteCommand>,
    events: Receiver<RouteEvent>,
}

impl RouterHandle {
    /// Queues a command without blocking.
    ///
    /// # Errors
    ///
    /// [`EngineError::QueueFull`] if the queue is at capacity,
    /// [`EngineError::Disconnected`] if the processor is gone.
    pub fn send(&self, command: RouteCommand) -> Result<(), EngineError> {
        self.commands.try_send(command).map_err(|e| match e {
            TrySendError::Full(command) => EngineError::QueueFull(command),
            TrySendError::Disconnected(_) => EngineError::Disconnected,
        })
    }

    /// Queues [`RouteCommand::Connect`].
    pub fn connect(&self, connector: Connector) -> Result<(), EngineError> {
        self.send(RouteCommand::Connect(connector))
    }

    /// Queues [`RouteCommand::Disconnect`].
    pub fn disconnect(&self, connector: Connector) -> Result<(), EngineError> {
        self.send(RouteCommand::Disconnect(connector))
    }

    /// Queues [`RouteCommand::MoveSource`].
    pub fn move_source(&self, target: Node, from: usize, to: usize) -> Result<(), EngineError> {
        self.send(RouteCommand::MoveSource { target, from, to })
    }

    /// Queues [`RouteCommand::RemovePlugin`].
    pub fn remove_plugin(&self, plugin: PluginId) -> Result<(), EngineError> {
        self.send(RouteCommand::RemovePlugin(plugin))
    }

    /// Queues [`RouteCommand::Clear`].
    pub fn clear(&self) -> Result<(), EngineError> {
        self.send(RouteCommand::Clear)
    }

    /// Returns the next event, if one is waiting.
    pub fn try_event(&self) -> Option<RouteEvent> {
        self.events.try_recv().ok()
    }

    /// Waits up to `timeout` for the next event.
    pub fn event_timeout(&self, timeout: Duration) -> Option<RouteEvent> {
        self.events.recv_timeout(timeout).ok()
    }

    /// Returns every event waiting right now.
    pub fn drain_events(&self) -> Vec<RouteEvent> {
        self.events.try_iter().collect()
    }

    /// Returns the number of commands not yet applied.
    pub fn pending(&self) -> usize {
        self.commands.len()
    }
}

/// Audio-thread side: owns the [`Router`] and renders blocks.
#[derive(Debug)]
pub struct RouterProcessor {
    router: Router,
    commands: Receiver<RouteCommand>,
    events: Sender<RouteEvent>,
    dropped_events: usize,
    disconnected: bool,
}

impl RouterProcessor {
    /// Applies queued edits, then renders one block of `n` samples.
    ///
    /// Returns how many commands were applied (accepted or rejected).
    ///
    /// Applying a `Connect` resolves endpoints and may allocate. Rendering
    /// itself does not.
    pub fn process_block(
        &mut self,
        host: &mut dyn PluginHost,
        n: usize,
        use_current_frame: bool,
    ) -> usize {
        let applied = self.apply_pending(&*host);
        self.router.work(host, n, use_current_frame);
        applied
    }

    /// Applies every queued edit without rendering.
    pub fn apply_pending(&mut self, host: &dyn PluginHost) -> usize {
        let mut applied = 0;
        loop {
            match self.commands.try_recv() {
                Ok(command) => {
                    let event = match self.apply(command, host) {
                        Ok(()) => RouteEvent::Applied(command),
                        Err(error) => {
                            tracing::warn!("route rejected: {command}: {error}");
                            RouteEvent::Rejected { command, error }
                        }
                    };
                    self.report(event);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.disconnected {
                        tracing::debug!("router handle dropped; routing table is now fixed");
                        self.disconnected = true;
                    }
                    break;
                }
            }
        }
        applied
    }

    /// Applies one command directly to the owned router.
    ///
    /// # Errors
    ///
    /// The [`RouteError`] that refused the edit. `Disconnect` of an absent
    /// link is reported as [`RouteError::ConnectorNotFound`].
    pub fn apply(
        &mut self,
        command: RouteCommand,
        host: &dyn PluginHost,
    ) -> Result<(), RouteError> {
        match command {
            RouteCommand::Connect(c) => self.router.connect(&c, host)?,
            RouteCommand::Disconnect(c) => {
                if !self.router.disconnect(&c) {
                    return Err(RouteError::ConnectorNotFound {
                        source: c.source,
                        target: c.target,
                    });
                }
            }
            RouteCommand::MoveSource { target, from, to } => {
                self.router.move_source(target, from, to)?;
            }
            RouteCommand::RemovePlugin(id) => {
                let removed = self.router.remove_plugin(id);
                tracing::debug!("removed {removed} links of {id}");
            }
            RouteCommand::Clear => self.router.clear(),
        }
        tracing::debug!("route applied: {command}");
        Ok(())
    }

    /// Returns the owned router.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Consumes the processor, returning the router.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Returns how many events were dropped because the event queue was full.
    pub fn dropped_events(&self) -> usize {
        self.dropped_events
    }

    fn report(&mut self, event: RouteEvent) {
        match self.events.try_send(event) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(_)) => self.dropped_events += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvbus_core::{PatchPlugin, PortFlow, PortKind, Rack, ValuePort};

    fn rack() -> (Rack, Connector) {
        let mut rack = Rack::new();
        let lfo = rack.insert(PatchPlugin::new().with_port(
            PortKind::Cv,
            0,
            ValuePort::new(PortFlow::Output, PortKind::Param, 0.25),
        ));
        let synth = rack.insert(PatchPlugin::new().with_port(
            PortKind::Param,
            0,
            ValuePort::new(PortFlow::Input, PortKind::Param, 0.0),
        ));
        (rack, Connector::new(Node::cv(lfo, 0), Node::param(synth, 0)))
    }

    #[test]
    fn commands_apply_at_the_next_block() {
        let (mut rack, link) = rack();
        let (handle, mut processor) = channel(Router::new(64), 8);
        handle.connect(link).unwrap();
        assert_eq!(handle.pending(), 1);
        assert!(processor.router().is_empty());

        assert_eq!(processor.process_block(&mut rack, 64, true), 1);
        assert!(processor.router().contains(&link));
        assert_eq!(
            handle.try_event(),
            Some(RouteEvent::Applied(RouteCommand::Connect(link)))
        );

        let value = rack
            .get(link.target.plugin_id)
            .unwrap()
            .port_value(PortKind::Param, PortFlow::Input, 0);
        assert_eq!(value, Some(0.25));
    }

    #[test]
    fn rejected_edits_are_reported() {
        let (rack, link) = rack();
        let (handle, mut processor) = channel(Router::new(64), 8);
        handle.disconnect(link).unwrap();
        processor.apply_pending(&rack);
        assert_eq!(
            handle.try_event(),
            Some(RouteEvent::Rejected {
                command: RouteCommand::Disconnect(link),
                error: RouteError::ConnectorNotFound {
                    source: link.source,
                    target: link.target,
                },
            })
        );
    }

    #[test]
    fn full_queue_returns_the_command() {
        let (handle, _processor) = channel(Router::new(64), 1);
        handle.clear().unwrap();
        assert!(matches!(
            handle.clear(),
            Err(EngineError::QueueFull(RouteCommand::Clear))
        ));
    }

    #[test]
    fn dropped_processor_disconnects_handle() {
        let (handle, processor) = channel(Router::new(64), 4);
        drop(processor);
        assert!(matches!(handle.clear(), Err(EngineError::Disconnected)));
    }

    #[test]
    fn undrained_events_are_counted() {
        let (rack, _) = rack();
        let (handle, mut processor) = channel(Router::new(64), 1);
        handle.clear().unwrap();
        processor.apply_pending(&rack);
        handle.clear().unwrap();
        processor.apply_pending(&rack);
        assert_eq!(processor.dropped_events(), 1);
        assert_eq!(handle.drain_events().len(), 1);
    }
}
