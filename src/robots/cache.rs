//! Per-host robots.txt cache
//!
//! Each host's rules are fetched at most once per crawl run. Concurrent
//! first-requests for the same host share a single in-flight fetch instead of
//! issuing duplicates, and any failure to retrieve the file is cached as an
//! empty fail-open rule set so it is not retried within the run.

use crate::robots::RobotsRuleSet;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// Fetches, parses, and caches [`RobotsRuleSet`]s per host
///
/// Hosts are keyed by their `scheme://authority` origin, so the http and
/// https variants of a site resolve independently.
pub struct RobotsCache {
    client: Client,
    agent: String,
    cells: Mutex<HashMap<String, Arc<OnceCell<Arc<RobotsRuleSet>>>>>,
}

impl RobotsCache {
    /// Creates a cache that fetches with the given client and matches rule
    /// groups against the given agent name
    pub fn new(client: Client, agent: impl Into<String>) -> Self {
        Self {
            client,
            agent: agent.into(),
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves the rules for a host, fetching `{host}/robots.txt` on first
    /// reference
    ///
    /// Never fails: unreachable or non-2xx robots.txt yields the empty
    /// rule set, and that outcome is cached like any other.
    pub async fn resolve(&self, host: &str) -> Arc<RobotsRuleSet> {
        let cell = {
            let mut cells = self.cells.lock().unwrap();
            cells
                .entry(host.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        cell.get_or_init(|| async { Arc::new(self.fetch(host).await) })
            .await
            .clone()
    }

    /// Returns the number of hosts with a completed resolution
    pub fn resolved_hosts(&self) -> usize {
        let cells = self.cells.lock().unwrap();
        cells.values().filter(|cell| cell.initialized()).count()
    }

    async fn fetch(&self, host: &str) -> RobotsRuleSet {
        let robots_url = format!("{}/robots.txt", host);
        tracing::debug!("Fetching robots.txt from {}", robots_url);

        let response = match self.client.get(&robots_url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("robots.txt unreachable for {} ({}), failing open", host, e);
                return RobotsRuleSet::default();
            }
        };

        if !response.status().is_success() {
            tracing::debug!(
                "robots.txt for {} returned HTTP {}, failing open",
                host,
                response.status().as_u16()
            );
            return RobotsRuleSet::default();
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Failed to read robots.txt body for {}: {}", host, e);
                return RobotsRuleSet::default();
            }
        };

        let rules = RobotsRuleSet::parse(&body, &self.agent);
        if !rules.sitemaps.is_empty() {
            tracing::info!(
                "robots.txt for {} lists {} sitemap URL(s)",
                host,
                rules.sitemaps.len()
            );
        }
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_cache() -> RobotsCache {
        RobotsCache::new(Client::new(), "kumo")
    }

    #[tokio::test]
    async fn test_resolve_parses_rules() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"),
            )
            .mount(&server)
            .await;

        let cache = test_cache();
        let rules = cache.resolve(&server.uri()).await;
        assert!(!rules.is_allowed("/admin"));
        assert!(rules.is_allowed("/public"));
    }

    #[tokio::test]
    async fn test_resolve_fails_open_on_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let cache = test_cache();
        let rules = cache.resolve(&server.uri()).await;
        assert!(rules.is_allowed("/anything"));
        assert!(rules.crawl_delay.is_none());
    }

    #[tokio::test]
    async fn test_resolve_fails_open_on_unreachable_host() {
        // Nothing listens here; connection is refused
        let cache = test_cache();
        let rules = cache.resolve("http://127.0.0.1:1").await;
        assert!(rules.is_allowed("/anything"));
    }

    #[tokio::test]
    async fn test_resolve_fetches_at_most_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /x"))
            .expect(1)
            .mount(&server)
            .await;

        let cache = test_cache();
        let first = cache.resolve(&server.uri()).await;
        let second = cache.resolve(&server.uri()).await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.resolved_hosts(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_resolutions_share_one_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("User-agent: *\nDisallow: /x")
                    .set_delay(std::time::Duration::from_millis(50)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let cache = Arc::new(test_cache());
        let host = server.uri();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let host = host.clone();
            handles.push(tokio::spawn(async move { cache.resolve(&host).await }));
        }
        for handle in handles {
            let rules = handle.await.unwrap();
            assert!(!rules.is_allowed("/x"));
        }
    }

    #[tokio::test]
    async fn test_failure_outcome_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let cache = test_cache();
        cache.resolve(&server.uri()).await;
        // Second resolve must not retry the failed fetch
        let rules = cache.resolve(&server.uri()).await;
        assert!(rules.is_allowed("/anything"));
    }
}
