use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
mod config;
mod driver;
mod sources;
mod utils;

use config::{parse_date, Config, DEFAULT_WORLDVIEW_DATE};
use utils::http::{build_client, DEFAULT_TIMEOUT_SECS};

/// Download small public sample datasets (GIBS imagery, Earth Observatory,
/// WRI) into data/ and leave instructions for providers that need a human
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Project root; files are written under <ROOT>/data
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Day of the Worldview true-color snapshot
    #[arg(long, default_value = DEFAULT_WORLDVIEW_DATE, value_parser = parse_date)]
    date: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::new(args.root);
    config.date = args.date;
    config.timeout = Duration::from_secs(args.timeout);

    let client = match build_client(config.timeout) {
        Ok(client) => Some(client),
        Err(e) => {
            println!("Failed to build HTTP client: {}", e);
            tracing::warn!(error = %e, "network downloads disabled for this run");
            None
        }
    };

    // Individual source failures are reported as they happen; the run itself always succeeds
    driver::run(client.as_ref(), &config).await;
}
