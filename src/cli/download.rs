//! Command-line interface

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::cancel::SharedCancel;
use crate::downloader::config::{
    DEFAULT_API_BASE, DEFAULT_FILE_CONCURRENCY, DEFAULT_SHARE_BASE, MAX_CONCURRENCY,
    MIN_REQUEST_INTERVAL_MS,
};
use crate::downloader::{DownloadExecutor, ErrorKind, WalkConfig};
use crate::fetcher::{ClientConfig, GithubHttpClient};
use crate::notify::Notifier;
use crate::output::SaveToDirectory;
use crate::resolver::{share_link, RepoRef};

use super::CliError;

/// Parse and validate a concurrency value
fn parse_concurrency(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value == 0 {
        return Err("concurrency must be at least 1".to_string());
    }
    if value > MAX_CONCURRENCY {
        return Err(format!(
            "concurrency {value} exceeds maximum of {MAX_CONCURRENCY}"
        ));
    }
    Ok(value)
}

/// Download a GitHub folder as a zip archive
#[derive(Parser, Debug)]
#[command(name = "gitget")]
#[command(about = "Download a GitHub repository folder as a zip archive", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Number of concurrent file downloads and directory listings (max: 32)
    ///
    /// Requests still start at most once per --min-interval-ms, so higher
    /// values mostly help when individual downloads are slow.
    #[arg(long, global = true, default_value_t = DEFAULT_FILE_CONCURRENCY, value_parser = parse_concurrency)]
    pub concurrency: usize,

    /// Minimum spacing between request starts, in milliseconds
    #[arg(long, global = true, default_value_t = MIN_REQUEST_INTERVAL_MS)]
    pub min_interval_ms: u64,

    /// GitHub contents-API base URL
    #[arg(long, global = true, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Serve Prometheus metrics on this address (e.g. 127.0.0.1:9000)
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,

    /// Only print errors and the final result
    #[arg(long, short, global = true, default_value_t = false)]
    pub quiet: bool,
}

impl Cli {
    /// HTTP client settings derived from the flags
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_base: self.api_base.clone(),
            min_request_interval: Duration::from_millis(self.min_interval_ms),
            ..ClientConfig::default()
        }
    }

    /// Walk settings derived from the flags
    pub fn walk_config(&self) -> WalkConfig {
        WalkConfig::default()
            .with_max_concurrent_files(self.concurrency)
            .with_max_concurrent_listings(self.concurrency)
    }

    /// Client on the process-wide resources unless the flags ask for a dedicated one
    fn build_client(&self) -> Result<GithubHttpClient, CliError> {
        let config = self.client_config();
        if config == ClientConfig::default() {
            Ok(GithubHttpClient::shared())
        } else {
            Ok(GithubHttpClient::from_config(&config)?)
        }
    }
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a repository or folder as <name>.zip
    Download(DownloadArgs),

    /// Show how a URL resolves, without network access
    Resolve(ResolveArgs),

    /// Print a shareable download link for a URL
    Link(LinkArgs),
}

/// Download command arguments
#[derive(Parser, Debug)]
pub struct DownloadArgs {
    /// GitHub URL (github.com/<owner>/<repo>[/tree/main/<path>])
    pub url: String,

    /// Directory the archive is saved into
    #[arg(long, short, default_value = ".")]
    pub output_dir: PathBuf,
}

impl DownloadArgs {
    /// Execute the download
    pub async fn execute(&self, cli: &Cli, cancel: SharedCancel) -> Result<(), CliError> {
        let client = cli.build_client()?;
        let api_base = client.api_base().to_string();
        let executor =
            DownloadExecutor::new(Arc::new(client), api_base, cli.walk_config()).with_cancel(cancel);

        let notifier = ConsoleNotifier::new(cli.quiet);
        let trigger = SaveToDirectory::new(&self.output_dir);

        info!(url = %self.url, output_dir = %self.output_dir.display(), "Starting download");
        let result = executor.execute(&self.url, &notifier, &trigger).await;
        notifier.finish();

        let summary = result?;
        if let Some(path) = trigger.saved_paths().last() {
            println!("Saved: {}", path.display());
        }
        if !cli.quiet {
            println!(
                "Files: {} ({} bytes, archive {} bytes) in {:.1}s",
                summary.files_written,
                summary.bytes_written,
                summary.archive_bytes,
                summary.elapsed.as_secs_f64()
            );
        }
        Ok(())
    }
}

/// Resolve command arguments
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// GitHub URL to resolve
    pub url: String,

    /// Print JSON instead of human-readable lines
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl ResolveArgs {
    /// Print the resolved reference
    pub fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let repo = RepoRef::parse(&self.url)?;
        let api_url = repo.api_url(&cli.api_base);

        if self.json {
            let output = serde_json::json!({
                "owner": repo.owner(),
                "repo": repo.repo(),
                "subpath": repo.subpath(),
                "api_url": api_url,
                "filename": repo.archive_filename(),
            });
            println!("{output}");
        } else {
            println!("Owner:    {}", repo.owner());
            println!("Repo:     {}", repo.repo());
            println!("Subpath:  {}", repo.subpath());
            println!("API URL:  {api_url}");
            println!("Filename: {}", repo.archive_filename());
        }
        Ok(())
    }
}

/// Link command arguments
#[derive(Parser, Debug)]
pub struct LinkArgs {
    /// GitHub URL to share
    pub url: String,

    /// Base URL of the download page
    #[arg(long, default_value = DEFAULT_SHARE_BASE)]
    pub base: String,
}

impl LinkArgs {
    /// Print the share link
    pub fn execute(&self) -> Result<(), CliError> {
        println!("{}", share_link(&self.base, &self.url)?);
        Ok(())
    }
}

/// Terminal notifier with a spinner while the walk runs
pub struct ConsoleNotifier {
    spinner: ProgressBar,
    quiet: bool,
}

impl ConsoleNotifier {
    /// Start the spinner (hidden when `quiet`)
    pub fn new(quiet: bool) -> Self {
        let spinner = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .expect("hardcoded template is valid"),
            );
            pb.enable_steady_tick(Duration::from_millis(120));
            pb
        };
        Self { spinner, quiet }
    }

    /// Stop and clear the spinner
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        self.spinner.println(message);
    }

    fn warning(&self, message: &str) {
        if !self.quiet {
            self.spinner.println(format!("warning: {message}"));
        }
    }

    fn error(&self, message: &str, kind: ErrorKind) {
        self.spinner.suspend(|| eprintln!("{kind}: {message}"));
    }

    fn info(&self, message: &str) {
        self.spinner.set_message(message.to_string());
    }
}
