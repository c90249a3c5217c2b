//! Crawl worker: the unit of concurrency
//!
//! Each worker loops claim → gate → fetch → extract, pushing discoveries
//! back into the frontier, until the manager signals stop. A worker that
//! finds the frontier momentarily empty backs off briefly and rechecks; it
//! never decides on its own that the crawl is over.

use crate::crawler::extractor::{extract_links, is_html_content_type};
use crate::crawler::fetcher::FetchOutcome;
use crate::crawler::frontier::FrontierEntry;
use crate::crawler::manager::{CrawlEvent, CrawlResult, CrawlShared};
use crate::url::host_of;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::watch;

pub(crate) async fn run_worker(
    shared: Arc<CrawlShared>,
    mut stop: watch::Receiver<bool>,
    id: usize,
) {
    tracing::debug!("Worker {} started", id);

    loop {
        if *stop.borrow() {
            break;
        }

        let entry = match shared.frontier.claim() {
            Some(entry) => entry,
            None => {
                // Momentarily empty; back off and recheck rather than
                // busy-spin. The stop signal also ends the pause.
                tokio::select! {
                    _ = tokio::time::sleep(shared.idle_backoff) => {}
                    _ = stop.changed() => {}
                }
                continue;
            }
        };

        process_entry(&shared, &mut stop, entry).await;
    }

    tracing::debug!("Worker {} stopped", id);
}

/// Handles one claimed frontier entry through gate, fetch, and extract
///
/// Every exit path calls `frontier.complete()` exactly once; failures are
/// reported and never halt the worker.
async fn process_entry(
    shared: &CrawlShared,
    stop: &mut watch::Receiver<bool>,
    entry: FrontierEntry,
) {
    let host = host_of(&entry.url);

    let rules = shared.robots.resolve(&host).await;
    if !rules.is_allowed(entry.url.path()) {
        tracing::debug!("Skipping {} (disallowed by robots.txt)", entry.url);
        shared.stats.skipped.fetch_add(1, Ordering::Relaxed);
        let _ = shared.events_tx.send(CrawlEvent::Skipped { url: entry.url });
        shared.frontier.complete();
        return;
    }

    // Abandon the politeness wait promptly when shutdown is signalled
    tokio::select! {
        _ = shared.politeness.wait_for_turn(&host) => {}
        _ = stop.wait_for(|stopped| *stopped) => {
            shared.frontier.complete();
            return;
        }
    }

    let outcome = tokio::select! {
        outcome = shared.fetcher.fetch(&entry.url) => outcome,
        _ = stop.wait_for(|stopped| *stopped) => {
            shared.frontier.complete();
            return;
        }
    };

    match outcome {
        FetchOutcome::Failure { kind } => {
            tracing::debug!("Giving up on {}: {}", entry.url, kind);
            shared.stats.failed.fetch_add(1, Ordering::Relaxed);
            let _ = shared.events_tx.send(CrawlEvent::Failed {
                url: entry.url,
                kind,
            });
        }
        FetchOutcome::Success {
            status,
            content_type,
            body,
        } => {
            let discovered_links = if is_html_content_type(&content_type) {
                extract_links(&body, &entry.url)
            } else {
                Vec::new()
            };

            let mut new_urls = 0;
            for link in &discovered_links {
                if shared.frontier.push(link.clone(), entry.depth + 1) {
                    new_urls += 1;
                }
            }

            tracing::debug!(
                "Fetched {} (depth {}, {} links, {} new)",
                entry.url,
                entry.depth,
                discovered_links.len(),
                new_urls
            );

            shared.stats.fetched.fetch_add(1, Ordering::Relaxed);
            let _ = shared.events_tx.send(CrawlEvent::Fetched(CrawlResult {
                url: entry.url,
                status,
                content: Some(body),
                discovered_links,
            }));
        }
    }

    shared.frontier.complete();
}
