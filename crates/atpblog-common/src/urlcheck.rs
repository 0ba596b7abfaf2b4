//! Paste-time URL sniffing.

use url::Url;

/// Schemes accepted for pasted links.
const LINK_SCHEMES: [&str; 2] = ["http", "https"];

/// Returns true when `text` parses as an absolute URL with a recognized
/// scheme and a non-empty host.
pub fn is_likely_url(text: &str) -> bool {
    let Ok(parsed) = Url::parse(text.trim()) else {
        return false;
    };
    LINK_SCHEMES.contains(&parsed.scheme()) && parsed.host_str().is_some_and(|h| !h.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_absolute_http_urls() {
        assert!(is_likely_url("https://example.com"));
        assert!(is_likely_url("http://example.com/path?q=1#frag"));
        assert!(is_likely_url("  https://example.com  "));
    }

    #[test]
    fn rejects_everything_else() {
        assert!(!is_likely_url(""));
        assert!(!is_likely_url("hello world"));
        assert!(!is_likely_url("example.com/no-scheme"));
        assert!(!is_likely_url("ftp://example.com"));
        assert!(!is_likely_url("mailto:someone@example.com"));
        assert!(!is_likely_url("https://"));
    }
}
