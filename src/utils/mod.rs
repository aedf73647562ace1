//! Utility functions and helpers.

pub mod dates;
pub mod http;
pub mod text;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Resolve an optional scraped `href` against a page URL string.
///
/// Blank hrefs become `None`; hrefs that cannot be joined are returned as-is.
pub fn absolutize(base_url: &str, href: Option<&str>) -> Option<String> {
    let href = href.map(str::trim).filter(|h| !h.is_empty())?;
    match Url::parse(base_url) {
        Ok(base) => Some(resolve_url(&base, href)),
        Err(_) => Some(href.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/path/").unwrap();
        assert_eq!(
            resolve_url(&base, "page.html"),
            "https://example.com/path/page.html"
        );
        assert_eq!(
            resolve_url(&base, "/root.html"),
            "https://example.com/root.html"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize("https://admiralomaha.com/events/", Some("/event/abc/")),
            Some("https://admiralomaha.com/event/abc/".to_string())
        );
        assert_eq!(absolutize("https://example.com/", Some("  ")), None);
        assert_eq!(absolutize("https://example.com/", None), None);
    }
}
