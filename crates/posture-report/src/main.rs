mod bootstrap_helpers;
mod cli_args;
mod render;
mod report;
mod snapshot_loader;

use anyhow::Result;
use clap::Parser;

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::Cli;
use crate::report::run_cli;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run_cli(cli)
}
