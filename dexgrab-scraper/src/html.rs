//! Small helpers shared by the HTML-scraping sources.

use reqwest::Url;
use scraper::Selector;

use crate::error::ScrapeError;

/// Compile a CSS selector.
pub fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector(format!("{css}: {e}")))
}

/// Parse an absolute URL.
pub fn parse_url(url: &str) -> Result<Url, ScrapeError> {
    Url::parse(url).map_err(|e| ScrapeError::url(url, e))
}

/// Resolve `href` against the page it was found on.
pub fn resolve(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(String::from)
}

/// Whether `href` carries its own scheme.
pub fn is_absolute(href: &str) -> bool {
    let href = href.trim_start();
    href.starts_with("http:") || href.starts_with("https:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_and_protocol_relative_links() {
        let base = parse_url("https://wiki.test/wiki/Clodsire_(Pok%C3%A9mon)").unwrap();
        assert_eq!(
            resolve(&base, "/wiki/File:0980Clodsire.png").as_deref(),
            Some("https://wiki.test/wiki/File:0980Clodsire.png")
        );
        assert_eq!(
            resolve(&base, "//media.test/a/b.png").as_deref(),
            Some("https://media.test/a/b.png")
        );
    }

    #[test]
    fn bad_selector_is_an_error() {
        assert!(matches!(selector("a >> ["), Err(ScrapeError::Selector(_))));
    }

    #[test]
    fn absolute_detection() {
        assert!(is_absolute("https://x.test/1"));
        assert!(!is_absolute("/3921.html"));
        assert!(!is_absolute("//x.test/1"));
    }
}
