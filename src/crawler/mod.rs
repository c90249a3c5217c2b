//! Crawler module: the concurrent fetch pipeline
//!
//! This module contains the core crawling machinery:
//! - The shared frontier queue with its dedup record
//! - Robots and politeness gating
//! - HTTP fetching with retry logic
//! - Link extraction
//! - Worker pool orchestration and termination detection

mod extractor;
mod fetcher;
mod frontier;
mod manager;
mod politeness;
mod worker;

pub use extractor::{extract_links, is_html_content_type};
pub use fetcher::{backoff_delay, build_http_client, ErrorKind, FetchOutcome, Fetcher};
pub use frontier::{Frontier, FrontierEntry};
pub use manager::{CrawlEvent, CrawlHandle, CrawlManager, CrawlResult, CrawlSummary};
pub use politeness::PolitenessController;

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for a crawl. It builds the run state,
/// spawns the worker pool, logs each per-URL outcome as it arrives, and
/// returns the aggregate summary once the frontier drains.
///
/// Callers that want the per-URL stream instead of log lines should use
/// [`CrawlManager::new`] directly and consume the event receiver
/// themselves.
pub async fn crawl(config: Config) -> Result<CrawlSummary> {
    let (manager, mut events) = CrawlManager::new(config)?;

    let event_logger = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                CrawlEvent::Fetched(result) => {
                    tracing::info!(
                        "Fetched {} (HTTP {}, {} links)",
                        result.url,
                        result.status,
                        result.discovered_links.len()
                    );
                }
                CrawlEvent::Failed { url, kind } => {
                    tracing::warn!("Gave up on {}: {}", url, kind);
                }
                CrawlEvent::Skipped { url } => {
                    tracing::info!("Skipped {} (disallowed by robots.txt)", url);
                }
            }
        }
    });

    let summary = manager.run().await;

    // run() dropped the event sender; the logger drains and exits
    let _ = event_logger.await;

    Ok(summary)
}
