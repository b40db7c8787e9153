//! LocalCam CLI
//!
//! Thin terminal front-end over the scanner facade: parse arguments, wire
//! Ctrl-C into the cancellation token, run one sweep, print the results.

mod args;
mod output;

use anyhow::Result;
use args::Args;
use clap::Parser;
use localcam_core::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    let cancel = CancellationToken::new();
    let ctrlc = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling sweep");
            ctrlc.cancel();
        }
    });

    info!(parallelism = args.parallelism, "starting sweep");
    let outcome = localcam_scanner::scan_with_cancel(args.parallelism, cancel).await;

    let (detections, diagnostics) = match outcome {
        Ok(outcome) => outcome,
        Err(Error::Cancelled) => {
            eprintln!("Scan cancelled.");
            std::process::exit(130);
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        let payload = if args.diagnostics {
            serde_json::json!({ "detections": detections, "diagnostics": diagnostics })
        } else {
            serde_json::json!({ "detections": detections })
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", output::render_detections(&detections));
        if args.diagnostics {
            println!();
            print!("{}", output::render_diagnostics(&diagnostics));
        }
    }

    Ok(())
}
