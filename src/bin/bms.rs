//! BMS CLI Binary

use anyhow::Context;
use bms::logging::init_logging;
use bms::tooling::cli::{Cli, CliContext};
use clap::Parser;
use std::process;

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.load_config().context("loading configuration")?;
    init_logging(Some(&config.logging)).context("initializing logging")?;

    let context = CliContext::new(config).context("opening storage")?;
    let output = context.execute(&cli.command)?;
    output
        .write_to(&mut std::io::stdout().lock())
        .context("writing output")?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
