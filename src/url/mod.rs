//! URL handling module for Kumo-Trail
//!
//! This module provides URL normalization and host extraction. The host of a
//! URL is the unit at which politeness delays and robots.txt rules are
//! scoped.

mod normalize;

// Re-export main functions
pub use normalize::{normalize_url, normalize_with_base};

use url::Url;

/// Returns the host key for a URL: its `scheme://authority` origin
///
/// Default ports are collapsed by the `url` crate, so
/// `http://example.com:80/a` and `http://example.com/b` share a host key,
/// while `http://example.com` and `https://example.com` do not.
pub fn host_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_of_plain() {
        let url = Url::parse("https://example.com/page?q=1").unwrap();
        assert_eq!(host_of(&url), "https://example.com");
    }

    #[test]
    fn test_host_of_collapses_default_port() {
        let url = Url::parse("http://example.com:80/page").unwrap();
        assert_eq!(host_of(&url), "http://example.com");
    }

    #[test]
    fn test_host_of_keeps_explicit_port() {
        let url = Url::parse("http://example.com:8080/page").unwrap();
        assert_eq!(host_of(&url), "http://example.com:8080");
    }

    #[test]
    fn test_host_of_scheme_distinguishes() {
        let http = Url::parse("http://example.com/").unwrap();
        let https = Url::parse("https://example.com/").unwrap();
        assert_ne!(host_of(&http), host_of(&https));
    }
}
