//! Main entry point for the gitget CLI

use clap::Parser;
use gitget::cancel::{self, CancelToken};
use gitget::cli::{Cli, CliError, Commands};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing(quiet: bool) {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let default_level = if quiet { "gitget=warn" } else { "gitget=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    if let Some(addr) = cli.metrics_addr {
        if let Err(e) = gitget::metrics::init_metrics(addr) {
            error!("{}", e);
            std::process::exit(1);
        }
    }

    // Install global cancel token and Ctrl+C handler
    let cancel = CancelToken::shared();
    cancel::set_global_cancel(cancel.clone());
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Ctrl+C received - cancelling download...");
                cancel.cancel();
            }
        }
    });

    let result = match cli.command {
        Commands::Download(ref args) => args
            .execute(&cli, cancel.clone())
            .await
            .map_err(|e| anyhow::anyhow!(e)),
        Commands::Resolve(ref args) => args.execute(&cli).map_err(|e| anyhow::anyhow!(e)),
        Commands::Link(ref args) => args.execute().map_err(|e| anyhow::anyhow!(e)),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        // Download failures were already reported by the notifier
        if let Some(CliError::ResolveError(_)) = e.downcast_ref::<CliError>() {
            eprintln!("{}: {}", gitget::ErrorKind::InvalidUrl, e);
        }
        std::process::exit(1);
    }
}
