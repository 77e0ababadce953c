pub mod scan;
pub mod tools;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use crowscout_common::config::DEFAULT_CONCURRENCY;
use crowscout_common::network::target::Target;

#[derive(Parser)]
#[command(name = "crowscout")]
#[command(about = "Recon and vulnerability scan orchestrator.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print results and warnings
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enumerate, probe and scan a domain and its subdomains
    #[command(alias = "s")]
    Scan(ScanArgs),
    /// Check which external tools are installed
    #[command(alias = "t")]
    Tools,
}

#[derive(Args)]
pub struct ScanArgs {
    /// Target domain (e.g., example.com)
    #[arg(short, long)]
    pub target: Target,

    /// Path to the JSON scan policy
    #[arg(short, long, default_value = "config/config.json")]
    pub config: PathBuf,

    /// Skip subdomain discovery and scan only the target
    #[arg(long)]
    pub no_subs: bool,

    /// Number of hosts scanned at the same time
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Do not print the banner
    #[arg(long)]
    pub no_banner: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
