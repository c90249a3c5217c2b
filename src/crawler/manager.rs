//! Crawl orchestration: worker pool lifecycle and termination detection
//!
//! The manager owns every piece of run-scoped state (frontier, robots cache,
//! politeness records) and hands workers shared references, so independent
//! crawl runs never touch each other and teardown is just dropping the run.
//! Completion is detected with the frontier's in-flight counter rather than
//! joining workers that would otherwise never return.

use crate::config::{validate, Config};
use crate::crawler::fetcher::{build_http_client, ErrorKind, Fetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::politeness::PolitenessController;
use crate::crawler::worker;
use crate::robots::RobotsCache;
use crate::url::normalize_url;
use crate::Result;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

/// Outcome of one successfully fetched page, handed to the output
/// collaborator
#[derive(Debug, Clone)]
pub struct CrawlResult {
    pub url: url::Url,
    pub status: u16,
    pub content: Option<String>,
    pub discovered_links: Vec<url::Url>,
}

/// Per-URL notifications streamed to the crawl's consumer
#[derive(Debug)]
pub enum CrawlEvent {
    /// Page fetched; body and discovered links attached
    Fetched(CrawlResult),

    /// Fetch failed after all retries
    Failed { url: url::Url, kind: ErrorKind },

    /// URL deliberately skipped because robots.txt disallows it
    Skipped { url: url::Url },
}

/// Aggregate counts for a finished (or cancelled) run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub pages_skipped: usize,
    pub urls_seen: usize,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Default)]
pub(crate) struct CrawlStats {
    pub fetched: AtomicUsize,
    pub failed: AtomicUsize,
    pub skipped: AtomicUsize,
}

/// State shared by the manager and every worker for one run
pub(crate) struct CrawlShared {
    pub frontier: Frontier,
    pub robots: Arc<RobotsCache>,
    pub politeness: PolitenessController,
    pub fetcher: Fetcher,
    pub events_tx: mpsc::UnboundedSender<CrawlEvent>,
    pub idle_backoff: Duration,
    pub stats: CrawlStats,
}

/// Cancels a running crawl from outside
#[derive(Clone)]
pub struct CrawlHandle {
    stop: Arc<watch::Sender<bool>>,
}

impl CrawlHandle {
    /// Signals every worker to stop; in-progress waits are abandoned and
    /// in-flight fetches are bounded by the request timeout
    pub fn cancel(&self) {
        self.stop.send_replace(true);
    }
}

/// Owns the worker pool for one crawl run
pub struct CrawlManager {
    config: Arc<Config>,
    shared: Arc<CrawlShared>,
    stop: Arc<watch::Sender<bool>>,
}

impl CrawlManager {
    /// Builds the run state and seeds the frontier
    ///
    /// Returns the manager together with the receiving end of the event
    /// stream. Configuration problems are the only error here.
    pub fn new(config: Config) -> Result<(Self, mpsc::UnboundedReceiver<CrawlEvent>)> {
        validate(&config)?;

        let client = build_http_client(&config.user_agent, config.crawler.fetch_timeout())?;
        let robots = Arc::new(RobotsCache::new(
            client.clone(),
            config.user_agent.crawler_name.clone(),
        ));

        let frontier = Frontier::new(config.crawler.max_depth);
        for seed in &config.seeds {
            let url = normalize_url(seed)?;
            frontier.push(url, 0);
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let shared = Arc::new(CrawlShared {
            frontier,
            politeness: PolitenessController::new(
                config.crawler.default_delay(),
                Arc::clone(&robots),
            ),
            robots,
            fetcher: Fetcher::new(
                client,
                config.crawler.max_retries,
                config.crawler.backoff_base(),
            ),
            events_tx,
            idle_backoff: config.crawler.idle_backoff(),
            stats: CrawlStats::default(),
        });

        let (stop, _) = watch::channel(false);

        let manager = Self {
            config: Arc::new(config),
            shared,
            stop: Arc::new(stop),
        };
        Ok((manager, events_rx))
    }

    /// Returns a handle for cancelling this run from another task
    pub fn handle(&self) -> CrawlHandle {
        CrawlHandle {
            stop: Arc::clone(&self.stop),
        }
    }

    /// Runs the crawl to completion or cancellation
    ///
    /// Spawns the configured number of workers, waits until the frontier is
    /// drained with no entry in flight (or the stop signal fires), then
    /// stops the pool and reports totals. A run with zero seeds terminates
    /// immediately with zero fetches.
    pub async fn run(self) -> CrawlSummary {
        let started_at = Utc::now();
        let worker_count = self.config.crawler.workers as usize;

        tracing::info!(
            "Starting crawl: {} seed URLs, {} workers",
            self.shared.frontier.len(),
            worker_count
        );

        let mut workers = JoinSet::new();
        for id in 0..worker_count {
            workers.spawn(worker::run_worker(
                Arc::clone(&self.shared),
                self.stop.subscribe(),
                id,
            ));
        }

        let poll = Duration::from_millis(20);
        let mut ticks: u64 = 0;
        let cancelled = loop {
            if *self.stop.borrow() {
                break true;
            }
            if self.shared.frontier.is_drained() {
                break false;
            }

            ticks += 1;
            if ticks % 250 == 0 {
                tracing::info!(
                    "Progress: {} fetched, {} queued, {} in flight",
                    self.shared.stats.fetched.load(Ordering::Relaxed),
                    self.shared.frontier.len(),
                    self.shared.frontier.in_flight()
                );
            }

            tokio::time::sleep(poll).await;
        };

        self.stop.send_replace(true);
        while workers.join_next().await.is_some() {}

        let summary = CrawlSummary {
            pages_fetched: self.shared.stats.fetched.load(Ordering::Relaxed),
            pages_failed: self.shared.stats.failed.load(Ordering::Relaxed),
            pages_skipped: self.shared.stats.skipped.load(Ordering::Relaxed),
            urls_seen: self.shared.frontier.seen_count(),
            cancelled,
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "Crawl {}: {} fetched, {} failed, {} skipped, {} URLs seen in {:?}",
            if summary.cancelled {
                "cancelled"
            } else {
                "complete"
            },
            summary.pages_fetched,
            summary.pages_failed,
            summary.pages_skipped,
            summary.urls_seen,
            (summary.finished_at - summary.started_at).to_std().unwrap_or_default()
        );

        summary
    }
}
