#![doc = "ERC20 load driver for Ethereum JSON-RPC nodes."]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod cli;
mod logging;
mod network;
mod report;
mod runner;

use clap::Parser;
use cli::Cli;
use eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.log.init_tracing()?;

    tracing::info!(workload = %cli.workload, rounds = cli.rounds, "starting erc20 benchmark");
    let report = runner::run(&cli).await?;
    report.log();

    if let Some(path) = &cli.output {
        report.save(path)?;
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(())
}
