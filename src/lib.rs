//! # gitget
//!
//! Download a GitHub repository, or any folder inside one, as a single zip
//! archive rebuilt from the GitHub contents API. No git checkout and no
//! authentication are involved.
//!
//! ## Features
//!
//! - **URL Resolution**: `github.com/<owner>/<repo>[/tree|blob/main/<path>]`
//! - **Recursive Walk**: directories are expanded as they are discovered,
//!   with separate bounds on concurrent file downloads and listings
//! - **Rate Limiting**: one process-wide pacing gate for every request
//! - **Partial Failure Tolerance**: a failed file or subdirectory becomes a
//!   warning, the rest of the tree is still archived
//! - **Cancellation**: every suspension point of a walk can be interrupted
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use gitget::downloader::{DownloadExecutor, WalkConfig};
//! use gitget::fetcher::GithubHttpClient;
//! use gitget::notify::LogNotifier;
//! use gitget::output::SaveToDirectory;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GithubHttpClient::shared();
//! let api_base = client.api_base().to_string();
//! let executor = DownloadExecutor::new(Arc::new(client), api_base, WalkConfig::default());
//!
//! executor
//!     .execute(
//!         "https://github.com/tokio-rs/tokio/tree/main/examples",
//!         &LogNotifier,
//!         &SaveToDirectory::new("downloads"),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`resolver`] - GitHub URL parsing and contents-API URL building
//! - [`fetcher`] - Listing and file download over HTTP, behind [`fetcher::ContentFetcher`]
//! - [`downloader`] - Rate limiting, the tree walk and download orchestration
//! - [`archive`] - In-memory zip builder
//! - [`notify`] - Success, warning and error notifications
//! - [`output`] - Delivery of the finished archive
//! - [`cancel`] - Cancellation tokens

#![warn(missing_docs)]
#![warn(clippy::all)]

/// In-memory zip archive builder
pub mod archive;

/// Cancellation of in-flight downloads
pub mod cancel;

/// CLI command implementations
pub mod cli;

/// Download orchestration
pub mod downloader;

/// Remote content fetching
pub mod fetcher;

/// Prometheus metrics
pub mod metrics;

/// User-facing notifications
pub mod notify;

/// Archive delivery
pub mod output;

/// GitHub URL resolution
pub mod resolver;

pub use downloader::{DownloadError, DownloadExecutor, ErrorKind};
pub use resolver::RepoRef;
