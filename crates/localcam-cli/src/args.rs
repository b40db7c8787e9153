//! Command-line argument definitions

use clap::Parser;

/// Discover TP-Link Tapo cameras on the local network
#[derive(Parser, Debug)]
#[command(name = "localcam", version, about, long_about = None)]
pub struct Args {
    /// Maximum concurrent host probes
    #[arg(short = 'p', long, value_name = "N", default_value = "64")]
    pub parallelism: usize,

    /// Emit results as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Include the full sweep diagnostics in the output
    #[arg(short = 'd', long)]
    pub diagnostics: bool,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    /// Log filter directive for the chosen verbosity
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "localcam_core=debug,localcam_net=debug,localcam_scanner=debug,warn",
            _ => "trace",
        }
    }
}
