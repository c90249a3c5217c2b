//! HTTP fetcher implementation
//!
//! This module handles page requests for the crawler:
//! - Building the shared HTTP client with the crawler's user agent
//! - GET requests with a bounded timeout
//! - Retry with exponential backoff
//! - Classifying failures into [`ErrorKind`]s

use crate::config::UserAgentConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Classification of a terminal per-URL failure
///
/// These are data, not `Err` values: one URL failing never fails the run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection failure, DNS failure, timeout, or redirect cap
    #[error("network error: {0}")]
    Network(String),

    /// Response carried a non-2xx status
    #[error("HTTP status {0}")]
    HttpStatus(u16),
}

/// Result of one logical fetch (initial attempt plus retries)
#[derive(Debug)]
pub enum FetchOutcome {
    Success {
        status: u16,
        content_type: String,
        body: String,
    },
    Failure {
        kind: ErrorKind,
    },
}

/// Builds the HTTP client shared by page fetches and robots.txt fetches
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs single logical fetches with bounded retry
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    backoff_base: Duration,
}

impl Fetcher {
    pub fn new(client: Client, max_retries: u32, backoff_base: Duration) -> Self {
        Self {
            client,
            max_retries,
            backoff_base,
        }
    }

    /// Fetches a URL, retrying up to `max_retries` times after the initial
    /// attempt
    ///
    /// Before retry `i` (0-based) the caller sleeps `backoff_base * 2^i`.
    /// Every failure class is retried identically, including non-2xx
    /// statuses; after the last attempt the most recent cause is returned.
    pub async fn fetch(&self, url: &Url) -> FetchOutcome {
        let mut last_kind = ErrorKind::Network("no attempt made".to_string());

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let pause = backoff_delay(self.backoff_base, attempt - 1);
                tracing::debug!(
                    "Retry {}/{} for {} in {:?}",
                    attempt,
                    self.max_retries,
                    url,
                    pause
                );
                tokio::time::sleep(pause).await;
            }

            match self.attempt(url).await {
                Ok(outcome) => return outcome,
                Err(kind) => {
                    tracing::debug!("Attempt {} for {} failed: {}", attempt + 1, url, kind);
                    last_kind = kind;
                }
            }
        }

        FetchOutcome::Failure { kind: last_kind }
    }

    /// One GET attempt; any non-2xx or transport error is an `Err` so the
    /// retry loop treats all causes alike
    async fn attempt(&self, url: &Url) -> Result<FetchOutcome, ErrorKind> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ErrorKind::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.text().await.map_err(classify_error)?;

        Ok(FetchOutcome::Success {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

/// Delay before retry `attempt` (0-based): `base * 2^attempt`
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.min(20)))
}

fn classify_error(e: reqwest::Error) -> ErrorKind {
    if e.is_timeout() {
        ErrorKind::Network("request timeout".to_string())
    } else if e.is_connect() {
        ErrorKind::Network(format!("connection failed: {}", e))
    } else if e.is_redirect() {
        ErrorKind::Network("too many redirects".to_string())
    } else {
        ErrorKind::Network(e.to_string())
    }
}
