// CLI module for cachefront

use clap::Parser;

/// cachefront - Two-tier offline caching gateway for a single static site origin
#[derive(Parser, Debug)]
#[command(name = "cachefront", version, about, long_about = None)]
pub struct Args {
    /// Path to an alternate config file
    #[arg(long)]
    pub config: Option<String>,

    /// Reuse existing cache tiers instead of repopulating the static tier
    #[arg(long)]
    pub skip_install: bool,
}
