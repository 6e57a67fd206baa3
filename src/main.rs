use anyhow::Context;
use clap::Parser;
use climate_summary::cli::{init_logging, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref()).context("failed to set up logging")?;
    run(cli).context("climate-summary failed")
}
