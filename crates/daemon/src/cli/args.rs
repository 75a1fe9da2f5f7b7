pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "awm")]
#[command(about = "Federated workload management gateway")]
pub struct Args {
    /// Gateway node to talk to (defaults to localhost on the configured api_port)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the awm config directory (defaults to ~/.awm)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
