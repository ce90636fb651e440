//! Demo patch rendering command.

use clap::Args;
use cvbus_config::EngineConfig;
use cvbus_engine::{RouteEvent, channel};
use serde::Serialize;
use std::path::PathBuf;

use crate::patch::{BlockReport, DemoPatch};

#[derive(Args)]
pub struct DemoArgs {
    /// Engine settings file (TOML); defaults are used when omitted
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Number of blocks to render
    #[arg(short, long, default_value = "8")]
    blocks: usize,

    /// Print the run as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct DemoRun {
    config: EngineConfig,
    events: Vec<String>,
    blocks: Vec<BlockReport>,
}

pub fn run(args: DemoArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::load_validated(path)?,
        None => EngineConfig::default(),
    };
    if args.blocks == 0 {
        anyhow::bail!("--blocks must be at least 1");
    }

    let mut patch = DemoPatch::new(&config, args.blocks);
    let links = patch.links();
    let (handle, mut processor) = channel(config.build_router(), config.queue_capacity);
    let mut events = Vec::new();
    // One edit in flight at a time, so any validated queue capacity works.
    for link in links {
        handle.connect(link)?;
        processor.apply_pending(&patch.rack);
        events.extend(handle.drain_events().into_iter().map(|e| describe(0, &e)));
    }

    let mut reports = Vec::with_capacity(args.blocks);
    for block in 0..args.blocks {
        // Halfway through, drop the constant from the fan-in.
        if block == args.blocks / 2 && block > 0 {
            handle.disconnect(links[0])?;
        }
        patch.advance(block);
        processor.process_block(&mut patch.rack, config.block_size, true);
        let routed = processor.router().connectors().count();
        reports.push(patch.report(block, routed));
        events.extend(handle.drain_events().into_iter().map(|e| describe(block, &e)));
    }
    if processor.dropped_events() > 0 {
        tracing::warn!("{} route events dropped", processor.dropped_events());
    }

    if args.json {
        let run = DemoRun {
            config,
            events,
            blocks: reports,
        };
        println!("{}", serde_json::to_string_pretty(&run)?);
        return Ok(());
    }

    for event in &events {
        println!("{event}");
    }
    println!();
    println!(
        "  {:>5}  {:>5}  {:>8}  {:>6}  {:>11}  {:>11}",
        "block", "links", "param", "legacy", "stream_peak", "stream_last"
    );
    for r in &reports {
        println!(
            "  {:>5}  {:>5}  {:>8.4}  {:>6}  {:>11.4}  {:>11.4}",
            r.block, r.links, r.param, r.legacy, r.stream_peak, r.stream_last
        );
    }
    Ok(())
}

fn describe(block: usize, event: &RouteEvent) -> String {
    match event {
        RouteEvent::Applied(command) => format!("[block {block}] applied: {command}"),
        RouteEvent::Rejected { command, error } => {
            format!("[block {block}] rejected: {command}: {error}")
        }
    }
}
