use crate::UrlError;
use url::Url;

/// Normalizes a URL string into its canonical absolute form
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Require an http or https scheme
/// 3. Require a host component
/// 4. Remove the fragment (everything after #)
///
/// Default ports are collapsed by the `url` crate during parsing, so two
/// URLs are equal iff their normalized serializations are equal.
///
/// # Examples
///
/// ```
/// use kumo_trail::url::normalize_url;
///
/// let url = normalize_url("https://example.com:443/page#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    finish(url)
}

/// Resolves a possibly-relative reference against a base URL and normalizes
/// the result
///
/// This is the form used for links discovered in page bodies, where hrefs
/// are routinely relative.
pub fn normalize_with_base(base: &Url, reference: &str) -> Result<Url, UrlError> {
    let url = base
        .join(reference)
        .map_err(|e| UrlError::Parse(e.to_string()))?;
    finish(url)
}

/// Applies the scheme/host checks and fragment stripping shared by both
/// entry points
fn finish(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}
