use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use uskill_cli::{execute_cli, init_tracing, Cli};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    execute_cli(cli).await
}
