//! # Topic Digest
//!
//! Batch entry point: one invocation collects, analyzes and publishes one
//! digest, then exits.
//!
//! ## Usage
//!
//! ```sh
//! GNEWS_API_KEY=... HF_API_KEY=... topic_digest -o ./public
//! ```

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use topic_digest::cli::Cli;
use topic_digest::utils::ensure_writable_dir;
use topic_digest::{
    Analyzer, Collector, DigestConfig, FileStore, GNewsSource, HfInference, HttpFeedFetcher,
    run_digest,
};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("topic_digest starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(
        output_dir = %args.output_dir,
        config = ?args.config,
        search_key_set = args.gnews_api_key.is_some(),
        inference_key_set = args.hf_api_key.is_some(),
        "Parsed CLI arguments"
    );

    // ---- Load config ----
    let mut config = match &args.config {
        Some(path) => DigestConfig::load(path).await.inspect_err(|e| {
            error!(path = %path, error = %e, "Failed to load configuration");
        })?,
        None => {
            info!("No configuration file given; using defaults");
            DigestConfig::default()
        }
    };
    if let Some(size) = args.digest_size {
        config.digest_size = size;
    }

    // Early check: ensure output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Wire up collaborators ----
    let client = reqwest::Client::builder().build()?;
    let search = GNewsSource::new(client.clone(), &config.collector, args.gnews_api_key);
    let feeds = HttpFeedFetcher::new(client.clone(), &config.collector);
    let inference = HfInference::new(client, &config.analyzer, args.hf_api_key);

    let collector = Collector::new(config.collector, search, feeds);
    let analyzer = Analyzer::new(inference, config.analyzer);
    let store = FileStore::new(&args.output_dir);

    // ---- Run ----
    let report = run_digest(&collector, &analyzer, &store, config.digest_size).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        count = report.count,
        path = %store.digest_path().display(),
        "Execution complete"
    );

    Ok(())
}
