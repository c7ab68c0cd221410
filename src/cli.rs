//! Command-line interface definitions for Topic Digest.
//!
//! All arguments can be provided via command-line flags; API keys may also
//! come from the environment.

use clap::Parser;

/// Command-line arguments for a digest run.
///
/// # Examples
///
/// ```sh
/// # Defaults: built-in configuration, digest written to ./public
/// topic_digest
///
/// # Custom configuration and output directory
/// topic_digest -c digest.yaml -o /var/www/digest
///
/// # Keys on the command line instead of the environment
/// topic_digest --gnews-api-key KEY --hf-api-key hf_KEY
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for digest.json
    #[arg(short, long, default_value = "public")]
    pub output_dir: String,

    /// Optional path to a YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// GNews API key; the search source is skipped without it
    #[arg(long, env = "GNEWS_API_KEY", hide_env_values = true)]
    pub gnews_api_key: Option<String>,

    /// Hugging Face API token; analysis falls back to local results without it
    #[arg(long, env = "HF_API_KEY", hide_env_values = true)]
    pub hf_api_key: Option<String>,

    /// Number of articles in the digest (overrides the configuration file)
    #[arg(long)]
    pub digest_size: Option<usize>,
}
