//! Command-line argument parsing for OTA Fetcher
//!
//! This module defines the CLI structure using clap derive macros,
//! providing a user-friendly interface for syncing distributions,
//! inspecting manifests, and reading cached translations.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// OTA Fetcher - Sync and read translation distributions
#[derive(Parser, Debug)]
#[command(
    name = "ota_fetcher",
    version,
    about = "Keep a local cache of translation distributions in sync",
    long_about = "A client for over-the-air translation distributions. Downloads locale files \
declared by a versioned manifest into a local cache with concurrent, failure-tolerant \
refreshes, and serves reads from disk without touching the network."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Cache directory path
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Distribution URL (overrides config file and environment)
    #[arg(short, long, global = true, value_name = "URL")]
    pub url: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download stale or missing locale files
    Sync(SyncArgs),

    /// Print cached translation content for one locale
    Get(GetArgs),

    /// List files declared by the distribution
    List(ListArgs),

    /// Show manifest information
    Info,
}

/// Arguments for the sync command
#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// Sync only this logical file (default: all files)
    #[arg(short, long)]
    pub file: Option<String>,

    /// Number of concurrent locale downloads
    #[arg(short = 'w', long, default_value = "16")]
    pub workers: usize,

    /// Leave expired locales alone, only fetch missing or corrupted ones
    #[arg(long)]
    pub skip_expired: bool,
}

/// Arguments for the get command
#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    /// Logical file name as declared in the manifest
    pub file: String,

    /// Locale code to read
    pub locale: String,

    /// Treat the locale code as an alias under this naming scheme
    #[arg(short, long)]
    pub scheme: Option<String>,
}

/// Arguments for the list command
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Also list the locales available for each file
    #[arg(long)]
    pub locales: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl SyncArgs {
    /// Reject argument combinations the engine would refuse anyway
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Number of workers must be greater than 0".to_string());
        }
        Ok(())
    }
}
