use anyhow::Result;
use clap::Parser;

mod analyzer;
mod cli;
mod config;
mod llm;
mod report;
mod retriever;
mod session;
mod workflow;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let (config, request) = args.into_parts()?;

    workflow::launch(&config, &request).await
}
