//! Robots.txt handling module
//!
//! This module provides parsing of robots.txt exclusion rules and a per-host
//! cache that fetches each host's rules at most once per crawl run, failing
//! open when the file cannot be retrieved.

mod cache;
mod rules;

pub use cache::RobotsCache;
pub use rules::RobotsRuleSet;
