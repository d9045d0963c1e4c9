// quick-net/src/validation.rs
use quick_common::error::{QuickError, Result};
use url::Url;

/// Validates a URL, ensuring it uses an HTTP(S) scheme and names a host.
pub fn validate_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str)
        .map_err(|e| QuickError::Validation(format!("Failed to parse URL '{url_str}': {e}")))?;
    match url.scheme() {
        "https" | "http" if url.host_str().is_some() => Ok(url),
        "https" | "http" => Err(QuickError::Validation(format!(
            "URL '{url_str}' has no host"
        ))),
        scheme => Err(QuickError::Validation(format!(
            "Invalid URL scheme for '{url_str}': must be http or https, but got '{scheme}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("https://raw.github.com/fourdollars/quick/master/packages/.index")]
    #[case("http://downloads.example.org/tool-1.0.tar.gz")]
    fn accepts_http_urls(#[case] url: &str) {
        assert!(validate_url(url).is_ok());
    }

    #[rstest]
    #[case("ftp://example.org/tool.tar.gz")]
    #[case("file:///tmp/tool.tar.gz")]
    #[case("not a url")]
    fn rejects_other_urls(#[case] url: &str) {
        assert!(matches!(validate_url(url), Err(QuickError::Validation(_))));
    }
}
