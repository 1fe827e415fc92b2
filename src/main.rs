use anyhow::{Context, Result};
use clap::Parser;
use reqwest::redirect::Policy;
use std::path::PathBuf;
use std::sync::Arc;

use inkfeed::content::HtmlDocumentParser;
use inkfeed::feed::ReqwestFetcher;
use inkfeed::{ArticleCache, Config, FeedIngestionService};

/// Get the config directory path (~/.config/inkfeed/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("inkfeed"))
}

/// Redirect policy for the proxy and feed hosts: at most 3 hops, no loops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

#[derive(Parser, Debug)]
#[command(name = "inkfeed", about = "Fetch a Medium feed and print normalized articles as JSON")]
struct Args {
    /// Config file (defaults to ~/.config/inkfeed/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Medium handle, with or without the leading '@'
    #[arg(long, value_name = "ID")]
    owner: Option<String>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let Some(owner) = args.owner.or_else(|| config.owner.clone()) else {
        eprintln!("Error: No feed owner given");
        eprintln!();
        eprintln!("Pass one on the command line:");
        eprintln!("  inkfeed --owner <handle>");
        eprintln!();
        eprintln!("Or set `owner` in {}.", config_path.display());
        std::process::exit(2);
    };

    let endpoints = config.endpoints().context("Invalid endpoint configuration")?;

    let http_client = reqwest::Client::builder()
        .redirect(create_redirect_policy())
        .pool_idle_timeout(std::time::Duration::from_secs(30))
        .timeout(config.request_timeout())
        .build()
        .context("Failed to build HTTP client")?;

    let fetcher = ReqwestFetcher::new(http_client)
        .with_timeout(config.request_timeout())
        .with_max_body_bytes(config.max_feed_bytes);
    let cache = Arc::new(ArticleCache::new(config.cache_ttl()));
    let service = FeedIngestionService::new(fetcher, HtmlDocumentParser, endpoints, cache);

    let batch = service.fetch_articles(&owner).await;

    let json = if args.compact {
        serde_json::to_string(batch.as_ref())
    } else {
        serde_json::to_string_pretty(batch.as_ref())
    }
    .context("Failed to serialize articles")?;
    println!("{json}");

    Ok(())
}
