//! In-process demo plugins for the `demo` command.
//!
//! Four plugins on a [`Rack`]:
//!
//! | plugin | exposes | per block |
//! |---|---|---|
//! | constant | `cv[0]` output, fixed at 0.25 | nothing |
//! | ramp | `cv[0]` output | rises linearly from 0 to 1 over the run |
//! | osc | one feedback channel | writes a block of a slow sine |
//! | recorder | `param[0]` input, `cv[0]` stream input, legacy `param[1]` (0..127) | nothing |

use cvbus_config::EngineConfig;
use cvbus_core::{
    Connector, Node, ParamAddress, ParamDescriptor, PatchPlugin, Plugin, PluginHost, PluginId,
    PortFlow, PortKind, Rack, ValuePort,
};
use serde::Serialize;

/// Level of the constant producer.
pub const CONSTANT_LEVEL: f32 = 0.25;

/// Legacy parameter on the recorder driven by the ramp.
pub const LEGACY_PARAM: ParamAddress = ParamAddress::global(1);

/// Sine period, in blocks.
const OSC_PERIOD_BLOCKS: usize = 8;

/// What the recorder held after one block.
#[derive(Debug, Clone, Serialize)]
pub struct BlockReport {
    /// Block index.
    pub block: usize,
    /// Number of links routed this block.
    pub links: usize,
    /// Typed `param[0]` input.
    pub param: f32,
    /// Legacy raw parameter.
    pub legacy: i32,
    /// Largest absolute sample of the `cv[0]` stream input.
    pub stream_peak: f32,
    /// Last sample of the `cv[0]` stream input.
    pub stream_last: f32,
}

/// The demo rack and the IDs of its plugins.
pub struct DemoPatch {
    pub rack: Rack,
    pub constant: PluginId,
    pub ramp: PluginId,
    pub osc: PluginId,
    pub recorder: PluginId,
    block_size: usize,
    total_blocks: usize,
    phase: f32,
    phase_step: f32,
    scratch: Vec<f32>,
}

impl DemoPatch {
    /// Builds the rack for `total_blocks` blocks of `config.block_size`.
    pub fn new(config: &EngineConfig, total_blocks: usize) -> Self {
        let mut rack = Rack::new();
        let output = |v| ValuePort::new(PortFlow::Output, PortKind::Param, v);

        let constant =
            rack.insert(PatchPlugin::new().with_port(PortKind::Cv, 0, output(CONSTANT_LEVEL)));
        let ramp = rack.insert(PatchPlugin::new().with_port(PortKind::Cv, 0, output(0.0)));
        let osc = rack.insert(PatchPlugin::new().with_feedback(
            1,
            config.buffer_mode(),
            config.block_size,
        ));
        let recorder = rack.insert(
            PatchPlugin::new()
                .with_port(
                    PortKind::Param,
                    0,
                    ValuePort::new(PortFlow::Input, PortKind::Param, 0.0),
                )
                .with_port(PortKind::Cv, 0, config.stream_port(PortFlow::Input, PortKind::Cv))
                .with_param(LEGACY_PARAM, ParamDescriptor::new(0, 127, 0)),
        );

        let period = (config.block_size * OSC_PERIOD_BLOCKS) as f32;
        Self {
            rack,
            constant,
            ramp,
            osc,
            recorder,
            block_size: config.block_size,
            total_blocks,
            phase: 0.0,
            phase_step: core::f32::consts::TAU / period,
            scratch: vec![0.0; config.block_size],
        }
    }

    /// The links the demo routes.
    ///
    /// The first one (constant into `param[0]`) is removed halfway through.
    pub fn links(&self) -> [Connector; 4] {
        let param = Node::param(self.recorder, 0);
        [
            Connector::new(Node::cv(self.constant, 0), param),
            Connector::new(Node::cv(self.ramp, 0), param),
            Connector::new(Node::audio(self.osc, 1), Node::cv(self.recorder, 0)),
            Connector::new(Node::cv(self.ramp, 0), Node::param(self.recorder, 1)),
        ]
    }

    /// Runs the producers for `block`.
    pub fn advance(&mut self, block: usize) {
        let level = block as f32 / self.total_blocks.saturating_sub(1).max(1) as f32;
        if let Some(ramp) = self.rack.get_mut(self.ramp) {
            ramp.set_port_value(PortKind::Cv, PortFlow::Output, 0, level.min(1.0));
        }

        for s in &mut self.scratch {
            *s = 0.5 * self.phase.sin();
            self.phase = (self.phase + self.phase_step) % core::f32::consts::TAU;
        }
        if let Some(osc) = self.rack.get_mut(self.osc) {
            osc.write_feedback(0, &self.scratch);
        }
    }

    /// Reads what the recorder holds now.
    pub fn report(&mut self, block: usize, links: usize) -> BlockReport {
        let mut report = BlockReport {
            block,
            links,
            param: 0.0,
            legacy: 0,
            stream_peak: 0.0,
            stream_last: 0.0,
        };
        let Some(recorder) = self.rack.get(self.recorder) else {
            return report;
        };
        report.param = recorder
            .port_value(PortKind::Param, PortFlow::Input, 0)
            .unwrap_or(0.0);
        report.legacy = recorder.param(LEGACY_PARAM).unwrap_or(0);

        let stream = self
            .rack
            .plugin(self.recorder)
            .and_then(|p| p.find_port(PortKind::Cv, PortFlow::Input, 0).map(|s| (p, s)))
            .and_then(|(p, slot)| p.port(slot));
        if let Some(port) = stream {
            self.scratch.resize(self.block_size, 0.0);
            port.get_block(&mut self.scratch, false);
            report.stream_peak = self.scratch.iter().fold(0.0f32, |m, s| m.max(s.abs()));
            report.stream_last = self.scratch.last().copied().unwrap_or(0.0);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvbus_core::Router;

    fn config() -> EngineConfig {
        EngineConfig {
            block_size: 16,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn links_resolve_against_the_rack() {
        let patch = DemoPatch::new(&config(), 4);
        let mut router = Router::new(16);
        for link in patch.links() {
            router.connect(&link, &patch.rack).unwrap();
        }
        assert_eq!(router.len(), 3);
    }

    #[test]
    fn recorder_sees_summed_and_streamed_values() {
        let mut patch = DemoPatch::new(&config(), 5);
        let mut router = Router::new(16);
        for link in patch.links() {
            router.connect(&link, &patch.rack).unwrap();
        }

        patch.advance(4);
        router.work(&mut patch.rack, 16, true);
        let report = patch.report(4, 4);
        assert!((report.param - (CONSTANT_LEVEL + 1.0)).abs() < 1e-6);
        assert_eq!(report.legacy, 127);
        assert!(report.stream_peak > 0.0 && report.stream_peak <= 0.5);
    }
}
