//! Command-line interface definitions using clap

use clap::Parser;

/// relaylink - send visitors to a target and bring them back
#[derive(Parser, Debug)]
#[command(name = "relaylink")]
#[command(version)]
#[command(about = "A minimal redirect relay", long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file (default: ./config.toml if present)
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    pub generate_config: bool,
}
