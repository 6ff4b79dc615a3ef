//! provision-cli entry point

mod actions;
mod backend;
mod cli;
mod config;
mod dataset;
mod export;
mod mapping;
mod run;
mod template;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = cli::Cli::parse();
    cli::run(cli).await
}
