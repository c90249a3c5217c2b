//! Kumo-Trail main entry point
//!
//! Command-line interface for the Kumo-Trail web crawler.

use clap::Parser;
use kumo_trail::config::{load_config_with_hash, Config};
use kumo_trail::crawler::{CrawlEvent, CrawlManager};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Kumo-Trail: a polite concurrent web crawler
///
/// Kumo-Trail crawls outward from a set of seed URLs while respecting
/// robots.txt rules and per-host politeness delays, and reports every
/// fetched page and the links discovered on it.
#[derive(Parser, Debug)]
#[command(name = "kumo-trail")]
#[command(version = "0.1.0")]
#[command(about = "A polite concurrent web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kumo_trail=info,warn"),
            1 => EnvFilter::new("kumo_trail=debug,info"),
            2 => EnvFilter::new("kumo_trail=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &Config) {
    println!("=== Kumo-Trail Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Default host delay: {}ms", config.crawler.default_delay_ms);
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);
    println!("  Max retries: {}", config.crawler.max_retries);
    println!("  Backoff base: {}ms", config.crawler.backoff_base_ms);
    match config.crawler.max_depth {
        Some(depth) => println!("  Max depth: {}", depth),
        None => println!("  Max depth: unbounded"),
    }

    println!("\nUser Agent:");
    println!("  Header: {}", config.user_agent.header_value());
    println!("  Robots token: {}", config.user_agent.crawler_name);

    println!("\nSeed URLs ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation, wiring Ctrl-C to cancellation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let (manager, mut events) = CrawlManager::new(config)?;

    let handle = manager.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping crawl");
            handle.cancel();
        }
    });

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                CrawlEvent::Fetched(result) => tracing::info!(
                    "Fetched {} (HTTP {}, {} links)",
                    result.url,
                    result.status,
                    result.discovered_links.len()
                ),
                CrawlEvent::Failed { url, kind } => {
                    tracing::warn!("Gave up on {}: {}", url, kind)
                }
                CrawlEvent::Skipped { url } => {
                    tracing::info!("Skipped {} (disallowed by robots.txt)", url)
                }
            }
        }
    });

    let summary = manager.run().await;
    let _ = printer.await;

    println!("\n=== Crawl Summary ===");
    println!("  Pages fetched: {}", summary.pages_fetched);
    println!("  Pages failed:  {}", summary.pages_failed);
    println!("  Pages skipped: {}", summary.pages_skipped);
    println!("  URLs seen:     {}", summary.urls_seen);
    println!("  Started:  {}", summary.started_at.to_rfc3339());
    println!("  Finished: {}", summary.finished_at.to_rfc3339());
    if summary.cancelled {
        println!("  (run was cancelled before the frontier drained)");
    }

    Ok(())
}
