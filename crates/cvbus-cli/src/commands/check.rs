//! Settings file validation command.

use clap::Args;
use cvbus_config::EngineConfig;
use std::path::PathBuf;

#[derive(Args)]
pub struct CheckArgs {
    /// Engine settings file (TOML)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Print the parsed settings as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let config = EngineConfig::load(&args.config)?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("{}: {e}", args.config.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}: ok", args.config.display());
    println!("  sample rate:    {} Hz", config.sample_rate);
    println!(
        "  block size:     {} samples ({:.2} ms)",
        config.block_size,
        config.block_duration() * 1000.0
    );
    println!("  buffer mode:    {:?}", config.buffer_mode);
    println!("  queue capacity: {}", config.queue_capacity);
    Ok(())
}
