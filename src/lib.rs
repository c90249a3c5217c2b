//! Kumo-Trail: a polite concurrent web crawler
//!
//! This crate implements a bounded pool of fetch workers that pulls URLs from
//! a shared frontier, enforces per-host rate limits and robots.txt compliance,
//! fetches pages with bounded retries, and feeds discovered links back into
//! the frontier until it drains.

pub mod config;
pub mod crawler;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Main error type for Kumo-Trail operations
///
/// Only conditions that are fatal to a whole crawl run live here; per-URL
/// failures are reported as [`crawler::ErrorKind`] values, not errors.
#[derive(Debug, Error)]
pub enum KumoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Kumo-Trail operations
pub type Result<T> = std::result::Result<T, KumoError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlEvent, CrawlResult, CrawlSummary, ErrorKind};
pub use url::{host_of, normalize_url};
