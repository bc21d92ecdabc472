//! Command handlers for OTA Fetcher CLI
//!
//! This module implements the handlers that coordinate between CLI
//! arguments and the core distribution cache engine. All real logic lives
//! in the engine; the handlers only wire up configuration, progress
//! display, and output formatting.

use std::time::Duration;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::app::{OtaClient, RefreshStats};
use crate::cli::{GetArgs, GlobalArgs, ListArgs, SyncArgs};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Handle the sync command
pub async fn handle_sync(global: &GlobalArgs, args: SyncArgs) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let client = build_client(global).await?;

    let names: Vec<String> = match &args.file {
        Some(name) => {
            if client.file(name).is_none() {
                return Err(AppError::generic(format!(
                    "Unknown file in distribution: {}",
                    name
                )));
            }
            vec![name.clone()]
        }
        None => client.list_files().to_vec(),
    };

    let progress = file_progress(global, names.len() as u64);
    let mut total = RefreshStats::default();
    for name in &names {
        progress.set_message(name.clone());
        let file = client.file(name).expect("name taken from the registry");
        let stats = file.refresh(!args.skip_expired, args.workers).await?;
        total.needed += stats.needed;
        total.downloaded += stats.downloaded;
        progress.inc(1);
    }
    progress.finish_and_clear();

    if !global.quiet {
        if total.needed == 0 {
            println!("All locales up to date ({} files)", names.len());
        } else {
            println!(
                "Synced {} of {} locales across {} files ({} failed)",
                total.downloaded,
                total.needed,
                names.len(),
                total.failed()
            );
        }
    }
    Ok(())
}

/// Handle the get command
pub async fn handle_get(global: &GlobalArgs, args: GetArgs) -> Result<()> {
    let client = build_client(global).await?;

    let file = client.file(&args.file).ok_or_else(|| {
        AppError::generic(format!("Unknown file in distribution: {}", args.file))
    })?;

    let content = match &args.scheme {
        Some(scheme) => file.content_by_alias(scheme, &args.locale).await,
        None => file.content(&args.locale).await,
    };

    match content {
        Some(content) => {
            print!("{}", content);
            Ok(())
        }
        None => Err(AppError::generic(format!(
            "No cached translation for locale {} of {}",
            args.locale, args.file
        ))),
    }
}

/// Handle the list command
pub async fn handle_list(global: &GlobalArgs, args: ListArgs) -> Result<()> {
    let client = build_client(global).await?;

    for name in client.list_files() {
        println!("{}", name);
        if args.locales {
            if let Some(file) = client.file(name) {
                let mut locales: Vec<&str> = file.locales().collect();
                locales.sort_unstable();
                for locale in locales {
                    println!("  {}", locale);
                }
            }
        }
    }
    Ok(())
}

/// Handle the info command
pub async fn handle_info(global: &GlobalArgs) -> Result<()> {
    let client = build_client(global).await?;
    let manifest = client.manifest();

    println!("Manifest timestamp: {}", manifest.timestamp());
    if let Some(published) = DateTime::<Utc>::from_timestamp(manifest.timestamp(), 0) {
        println!("Published at:       {}", published.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    println!("Files:              {}", manifest.files().len());
    println!("Locales:            {}", manifest.locales().count());
    println!("Locale aliases:     {}", manifest.mapping().len());
    Ok(())
}

/// Build the distribution client from resolved configuration
///
/// Construction fetches the manifest and runs the initial refresh pass for
/// every file, so the cache is populated by the time a handler proceeds.
async fn build_client(global: &GlobalArgs) -> Result<OtaClient> {
    let config = AppConfig::load(global.config.as_deref())?;
    let url = config.resolve_url(global.url.as_deref())?;
    let cache_dir = config.resolve_cache_dir(global.cache_dir.as_deref())?;

    info!("Using distribution {} with cache {}", url, cache_dir.display());

    let spinner = manifest_spinner(global);
    let client = OtaClient::with_config(&url, cache_dir, config.client_config()).await;
    spinner.finish_and_clear();
    client
}

/// Spinner shown while the manifest is fetched and the cache warmed up
fn manifest_spinner(global: &GlobalArgs) -> ProgressBar {
    if !show_progress(global) {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["◐", "◓", "◑", "◒"]),
    );
    spinner.set_message("Fetching distribution manifest...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Per-file progress bar for the sync command
fn file_progress(global: &GlobalArgs, len: u64) -> ProgressBar {
    if !show_progress(global) {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(len);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{bar:30.green} {pos}/{len} {msg}")
            .unwrap(),
    );
    progress
}

/// Progress display only on interactive terminals, and never in quiet mode
fn show_progress(global: &GlobalArgs) -> bool {
    !global.quiet && atty::is(atty::Stream::Stderr)
}
