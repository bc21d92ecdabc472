//! OTA Fetcher CLI application
//!
//! Command-line interface for syncing and reading over-the-air translation
//! distributions.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use ota_fetcher::cli::{handle_get, handle_info, handle_list, handle_sync, Cli, Commands};
use ota_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();
    init_logging(&cli);

    info!("OTA Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Sync(args) => handle_sync(&cli.global, args).await,
        Commands::Get(args) => handle_get(&cli.global, args).await,
        Commands::List(args) => handle_list(&cli.global, args).await,
        Commands::Info => handle_info(&cli.global).await,
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("ota_fetcher={}", log_level).parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .init();
}
