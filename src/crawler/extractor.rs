//! Link extraction from fetched HTML
//!
//! Pulls `a[href]` targets in document order, resolves them against the
//! page's own URL, and keeps only well-formed absolute http(s) URLs.
//! Duplicates within one page are kept; deduplication is the frontier's
//! responsibility.

use crate::url::normalize_with_base;
use scraper::{Html, Selector};
use url::Url;

/// Extracts outbound links from an HTML document
///
/// Output order matches document order. Unresolvable or non-http(s) hrefs
/// are discarded silently.
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(url) = resolve_href(href, base_url) {
                    links.push(url);
                }
            }
        }
    }

    links
}

/// Returns true if the response content type is parseable HTML
pub fn is_html_content_type(content_type: &str) -> bool {
    content_type.contains("text/html") || content_type.contains("application/xhtml")
}

/// Resolves one href to an absolute URL, or None if it should be excluded
///
/// Excluded: empty hrefs, fragment-only anchors, and `javascript:`,
/// `mailto:`, `tel:`, `data:` pseudo-links.
fn resolve_href(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    normalize_with_base(base_url, href).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/dir/page").unwrap()
    }

    fn extracted(html: &str) -> Vec<String> {
        extract_links(html, &base_url())
            .into_iter()
            .map(|u| u.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_extract_absolute_link() {
        let links = extracted(r#"<a href="https://other.com/x">Link</a>"#);
        assert_eq!(links, vec!["https://other.com/x"]);
    }

    #[test]
    fn test_extract_relative_links() {
        let links = extracted(r#"<a href="/root">A</a><a href="sibling">B</a>"#);
        assert_eq!(
            links,
            vec!["https://example.com/root", "https://example.com/dir/sibling"]
        );
    }

    #[test]
    fn test_document_order_preserved() {
        let html = r#"
            <p><a href="/1">1</a></p>
            <div><a href="/2">2</a><span><a href="/3">3</a></span></div>
        "#;
        assert_eq!(
            extracted(html),
            vec![
                "https://example.com/1",
                "https://example.com/2",
                "https://example.com/3"
            ]
        );
    }

    #[test]
    fn test_duplicates_kept() {
        let links = extracted(r#"<a href="/same">A</a><a href="/same">B</a>"#);
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_fragment_stripped_from_link() {
        let links = extracted(r#"<a href="/page#section">Link</a>"#);
        assert_eq!(links, vec!["https://example.com/page"]);
    }

    #[test]
    fn test_skip_pseudo_links() {
        let html = r##"
            <a href="javascript:void(0)">js</a>
            <a href="mailto:x@example.com">mail</a>
            <a href="tel:+123">tel</a>
            <a href="data:text/plain,hi">data</a>
            <a href="#top">anchor</a>
            <a href="">empty</a>
        "##;
        assert!(extracted(html).is_empty());
    }

    #[test]
    fn test_skip_non_http_schemes() {
        let links = extracted(r#"<a href="ftp://example.com/file">ftp</a>"#);
        assert!(links.is_empty());
    }

    #[test]
    fn test_anchors_without_href_ignored() {
        let links = extracted(r#"<a name="top">no href</a><a href="/yes">ok</a>"#);
        assert_eq!(links, vec!["https://example.com/yes"]);
    }

    #[test]
    fn test_is_html_content_type() {
        assert!(is_html_content_type("text/html"));
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("application/xhtml+xml"));
        assert!(!is_html_content_type("application/json"));
        assert!(!is_html_content_type("image/png"));
        assert!(!is_html_content_type(""));
    }
}
