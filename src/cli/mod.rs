//! CLI command implementations

pub mod download;
pub mod error;

pub use download::{Cli, Commands, ConsoleNotifier, DownloadArgs, LinkArgs, ResolveArgs};
pub use error::CliError;
