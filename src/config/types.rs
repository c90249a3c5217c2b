use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Kumo-Trail
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Seed URLs the crawl starts from; may be empty
    #[serde(default)]
    pub seeds: Vec<String>,

    pub crawler: CrawlerConfig,

    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent fetch workers
    pub workers: u32,

    /// Default minimum delay between fetches to the same host (milliseconds);
    /// a larger robots.txt crawl-delay overrides it
    #[serde(rename = "default-delay-ms")]
    pub default_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: u64,

    /// Retries after the initial attempt before a fetch is recorded failed
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base for the exponential retry backoff (milliseconds)
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// Maximum discovery depth from a seed; absent means unbounded
    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,

    /// Pause before a worker rechecks a momentarily empty frontier
    /// (milliseconds)
    #[serde(rename = "idle-backoff-ms", default = "default_idle_backoff_ms")]
    pub idle_backoff_ms: u64,
}

fn default_idle_backoff_ms() -> u64 {
    50
}

impl CrawlerConfig {
    pub fn default_delay(&self) -> Duration {
        Duration::from_millis(self.default_delay_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }
}

/// User agent identification configuration
///
/// `crawler_name` doubles as the token matched against robots.txt
/// `User-agent` groups; the full header value carries version and contact
/// details.
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Full HTTP User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value_format() {
        let ua = UserAgentConfig {
            crawler_name: "kumo-trail".to_string(),
            crawler_version: "0.1".to_string(),
            contact_url: "https://example.com/bot".to_string(),
            contact_email: "crawl@example.com".to_string(),
        };
        assert_eq!(
            ua.header_value(),
            "kumo-trail/0.1 (+https://example.com/bot; crawl@example.com)"
        );
    }

    #[test]
    fn test_duration_helpers() {
        let config = CrawlerConfig {
            workers: 4,
            default_delay_ms: 2000,
            fetch_timeout_secs: 10,
            max_retries: 3,
            backoff_base_ms: 1000,
            max_depth: None,
            idle_backoff_ms: 50,
        };
        assert_eq!(config.default_delay(), Duration::from_secs(2));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.backoff_base(), Duration::from_secs(1));
        assert_eq!(config.idle_backoff(), Duration::from_millis(50));
    }
}
