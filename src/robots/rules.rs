//! Robots.txt rule parsing
//!
//! Hand-parses the subset of robots.txt this crawler obeys: per-agent-group
//! Allow/Disallow path prefixes, Crawl-delay, and host-global Sitemap lines.
//! Malformed lines are skipped, never fatal.

use std::time::Duration;

/// Parsed exclusion rules for one host, scoped to one effective user-agent
///
/// The effective group is the union of every group whose agent token matches
/// the crawler's configured name or `*`. For crawl-delay, an exact-name group
/// takes precedence over a `*` group.
///
/// An empty rule set (the [`Default`]) allows everything and carries no
/// crawl-delay; it is what unreachable or malformed robots.txt resolves to.
#[derive(Debug, Clone, Default)]
pub struct RobotsRuleSet {
    /// Allowed path prefixes, in file order
    allow: Vec<String>,

    /// Disallowed path prefixes, in file order
    disallow: Vec<String>,

    /// Requested minimum delay between fetches, if any
    pub crawl_delay: Option<Duration>,

    /// Sitemap URLs listed anywhere in the file
    pub sitemaps: Vec<String>,
}

impl RobotsRuleSet {
    /// Parses robots.txt content for the given crawler agent name
    ///
    /// Lines are trimmed; blank lines and `#` comments are ignored.
    /// Directive names match case-insensitively. Consecutive `User-agent`
    /// lines open one group that the following rules belong to.
    pub fn parse(content: &str, agent: &str) -> Self {
        let agent = agent.to_lowercase();

        let mut ruleset = Self::default();
        let mut group_agents: Vec<String> = Vec::new();
        let mut in_agent_run = false;
        let mut exact_delay: Option<Duration> = None;
        let mut wildcard_delay: Option<Duration> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    // A run of consecutive User-agent lines names one group
                    if !in_agent_run {
                        group_agents.clear();
                    }
                    group_agents.push(value.to_lowercase());
                    in_agent_run = true;
                    continue;
                }
                // Sitemap is host-global, independent of grouping
                "sitemap" => {
                    if !value.is_empty() {
                        ruleset.sitemaps.push(value.to_string());
                    }
                }
                "disallow" if group_matches(&group_agents, &agent) => {
                    if !value.is_empty() {
                        ruleset.disallow.push(value.to_string());
                    }
                }
                "allow" if group_matches(&group_agents, &agent) => {
                    if !value.is_empty() {
                        ruleset.allow.push(value.to_string());
                    }
                }
                "crawl-delay" if group_matches(&group_agents, &agent) => {
                    // Unparseable delay values are ignored
                    if let Ok(seconds) = value.parse::<f64>() {
                        if seconds >= 0.0 && seconds.is_finite() {
                            let delay = Duration::from_secs_f64(seconds);
                            if group_agents.iter().any(|a| a == &agent) {
                                exact_delay = Some(delay);
                            } else {
                                wildcard_delay = Some(delay);
                            }
                        }
                    }
                }
                _ => {}
            }

            in_agent_run = false;
        }

        // Most specific group wins for crawl-delay
        ruleset.crawl_delay = exact_delay.or(wildcard_delay);
        ruleset
    }

    /// Checks whether a URL path is allowed by these rules
    ///
    /// An Allow prefix match takes precedence over a Disallow match; a path
    /// matching no rule is allowed.
    pub fn is_allowed(&self, path: &str) -> bool {
        if self.allow.iter().any(|prefix| path.starts_with(prefix)) {
            return true;
        }
        if self.disallow.iter().any(|prefix| path.starts_with(prefix)) {
            return false;
        }
        true
    }

    /// Returns true if nothing is disallowed and no crawl-delay is set
    pub fn is_permissive(&self) -> bool {
        self.disallow.is_empty() && self.crawl_delay.is_none()
    }
}

/// True if the current group applies to the configured agent
fn group_matches(group_agents: &[String], agent: &str) -> bool {
    group_agents.iter().any(|a| a == "*" || a == agent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_allows_everything() {
        let rules = RobotsRuleSet::default();
        assert!(rules.is_allowed("/"));
        assert!(rules.is_allowed("/admin"));
        assert!(rules.crawl_delay.is_none());
        assert!(rules.is_permissive());
    }

    #[test]
    fn test_disallow_prefix() {
        let rules = RobotsRuleSet::parse("User-agent: *\nDisallow: /admin", "kumo");
        assert!(rules.is_allowed("/"));
        assert!(rules.is_allowed("/page"));
        assert!(!rules.is_allowed("/admin"));
        assert!(!rules.is_allowed("/admin/users"));
    }

    #[test]
    fn test_disallow_all() {
        let rules = RobotsRuleSet::parse("User-agent: *\nDisallow: /", "kumo");
        assert!(!rules.is_allowed("/"));
        assert!(!rules.is_allowed("/anything"));
    }

    #[test]
    fn test_allow_overrides_disallow() {
        let content = "User-agent: *\nDisallow: /private\nAllow: /private/public";
        let rules = RobotsRuleSet::parse(content, "kumo");
        assert!(!rules.is_allowed("/private"));
        assert!(!rules.is_allowed("/private/secret"));
        assert!(rules.is_allowed("/private/public"));
        assert!(rules.is_allowed("/private/public/deep"));
    }

    #[test]
    fn test_empty_disallow_value_ignored() {
        let rules = RobotsRuleSet::parse("User-agent: *\nDisallow:", "kumo");
        assert!(rules.is_allowed("/anything"));
    }

    #[test]
    fn test_other_agent_group_ignored() {
        let content = "User-agent: badbot\nDisallow: /\n\nUser-agent: *\nDisallow: /tmp";
        let rules = RobotsRuleSet::parse(content, "kumo");
        assert!(rules.is_allowed("/page"));
        assert!(!rules.is_allowed("/tmp/file"));
    }

    #[test]
    fn test_exact_agent_group_applies() {
        let content = "User-agent: kumo\nDisallow: /no-kumo";
        let rules = RobotsRuleSet::parse(content, "kumo");
        assert!(!rules.is_allowed("/no-kumo"));
    }

    #[test]
    fn test_agent_match_case_insensitive() {
        let content = "User-Agent: Kumo\nDisallow: /x";
        let rules = RobotsRuleSet::parse(content, "kumo");
        assert!(!rules.is_allowed("/x"));
    }

    #[test]
    fn test_rules_unioned_across_applicable_groups() {
        let content = "User-agent: *\nDisallow: /a\n\nUser-agent: kumo\nDisallow: /b";
        let rules = RobotsRuleSet::parse(content, "kumo");
        assert!(!rules.is_allowed("/a"));
        assert!(!rules.is_allowed("/b"));
        assert!(rules.is_allowed("/c"));
    }

    #[test]
    fn test_shared_group_consecutive_agents() {
        let content = "User-agent: botA\nUser-agent: kumo\nDisallow: /shared";
        let rules = RobotsRuleSet::parse(content, "kumo");
        assert!(!rules.is_allowed("/shared"));
    }

    #[test]
    fn test_crawl_delay_wildcard() {
        let rules = RobotsRuleSet::parse("User-agent: *\nCrawl-delay: 10", "kumo");
        assert_eq!(rules.crawl_delay, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_crawl_delay_exact_beats_wildcard() {
        let content = "User-agent: *\nCrawl-delay: 10\n\nUser-agent: kumo\nCrawl-delay: 2";
        let rules = RobotsRuleSet::parse(content, "kumo");
        assert_eq!(rules.crawl_delay, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_crawl_delay_fractional() {
        let rules = RobotsRuleSet::parse("User-agent: *\nCrawl-delay: 2.5", "kumo");
        assert_eq!(rules.crawl_delay, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_crawl_delay_unparseable_ignored() {
        let rules = RobotsRuleSet::parse("User-agent: *\nCrawl-delay: soon", "kumo");
        assert!(rules.crawl_delay.is_none());
    }

    #[test]
    fn test_sitemaps_collected_globally() {
        let content = "Sitemap: https://example.com/a.xml\n\
                       User-agent: otherbot\nDisallow: /\n\
                       Sitemap: https://example.com/b.xml";
        let rules = RobotsRuleSet::parse(content, "kumo");
        assert_eq!(
            rules.sitemaps,
            vec![
                "https://example.com/a.xml".to_string(),
                "https://example.com/b.xml".to_string()
            ]
        );
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let content = "# top comment\n\nUser-agent: *\n# inner comment\nDisallow: /hidden\n";
        let rules = RobotsRuleSet::parse(content, "kumo");
        assert!(!rules.is_allowed("/hidden"));
        assert!(rules.is_allowed("/visible"));
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let content = "this is not a directive\nUser-agent: *\n???\nDisallow: /x";
        let rules = RobotsRuleSet::parse(content, "kumo");
        assert!(!rules.is_allowed("/x"));
        assert!(rules.is_allowed("/y"));
    }

    #[test]
    fn test_garbage_content_allows_everything() {
        let rules = RobotsRuleSet::parse("random text {{{ not robots", "kumo");
        assert!(rules.is_allowed("/any/path"));
    }
}
