// CLI modules
mod cli;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Daemon, Health, Init, List, Version};

command_enum! {
    (Daemon, Daemon),
    (Health, Health),
    (Init, Init),
    (List, List),
    (Version, Version),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Resolve remote URL: explicit flag > config api_port > 8080
    let remote = cli::op::resolve_remote(args.remote, args.config_path.clone())
        .context("invalid remote URL")?;

    // Build context - always has API client initialized
    let ctx = cli::op::OpContext::new(remote, args.config_path)
        .context("failed to create API client")?;

    let output = args.command.execute(&ctx).await?;
    println!("{}", output);
    Ok(())
}
