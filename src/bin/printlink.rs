//! Printlink CLI Binary
//!
//! Command-line interface for inspecting the printlink configuration.

use anyhow::Context;
use clap::Parser;
use printlink::cli::{Cli, RunContext};
use printlink::logging::init_logging;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("Command failed: {:#}", e);
        eprintln!("{:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = cli.load_config().context("Error loading configuration")?;
    cli.apply_logging_overrides(&mut config);

    init_logging(&config.logging).context("Failed to initialize logging")?;
    info!("Printlink CLI starting");

    let context = RunContext::new(cli.config_dir.clone(), config);
    let output = context.execute(&cli.command)?;
    info!("Command completed successfully");
    println!("{}", output);
    Ok(())
}
