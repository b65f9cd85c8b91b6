//! Gallery source: paged thumbnail listings, one detail page per thumbnail.

use std::path::Path;

use dexgrab_core::{Entity, Source, zerochan_search_term, zerochan_search_url};
use reqwest::Url;
use scraper::Html;

use crate::client::{ExpectedKind, Fetcher, fetch};
use crate::config::ZerochanConfig;
use crate::download::{Acquired, Candidate, DedupSet, acquire_candidate};
use crate::error::ScrapeError;
use crate::html::{is_absolute, parse_url, resolve, selector};
use crate::report::SourceReport;

/// One listing page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Thumbnail anchors found; zero means the results are exhausted.
    pub thumbnails: usize,
    /// Detail pages behind the relative thumbnail links.
    pub detail_pages: Vec<String>,
}

pub fn parse_listing(html: &str, page_url: &Url) -> Result<Listing, ScrapeError> {
    let document = Html::parse_document(html);
    let thumbs = selector("#thumbs > li > a:first-of-type")?;

    let mut listing = Listing::default();
    for anchor in document.select(&thumbs) {
        listing.thumbnails += 1;
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if is_absolute(href) {
            continue;
        }
        if let Some(url) = resolve(page_url, href) {
            if !listing.detail_pages.contains(&url) {
                listing.detail_pages.push(url);
            }
        }
    }
    Ok(listing)
}

/// Full-resolution URL on a detail page.
///
/// Tries, in order: any anchor pointing at `static_host`; then inside
/// `#large`, the first anchor or image that points there.
pub fn parse_detail(
    html: &str,
    page_url: &Url,
    static_host: &str,
) -> Result<Option<String>, ScrapeError> {
    let document = Html::parse_document(html);
    let direct = selector(&format!("a[href*=\"{}\"]", static_host))?;
    let large = selector("#large")?;
    let anchor = selector("a")?;
    let image = selector("img")?;

    if let Some(href) = document
        .select(&direct)
        .next()
        .and_then(|a| a.value().attr("href"))
    {
        return Ok(resolve(page_url, href));
    }

    let Some(container) = document.select(&large).next() else {
        return Ok(None);
    };
    let inner_href = container
        .select(&anchor)
        .next()
        .and_then(|a| a.value().attr("href"))
        .filter(|href| href.contains(static_host));
    let inner_src = || {
        container
            .select(&image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .filter(|src| src.contains(static_host))
    };

    Ok(inner_href.or_else(inner_src).and_then(|url| resolve(page_url, url)))
}

fn detail_image(
    fetcher: &dyn Fetcher,
    detail_page: &str,
    static_host: &str,
) -> Result<Option<String>, ScrapeError> {
    let page_url = parse_url(detail_page)?;
    let resp = fetch(fetcher, detail_page, &[], ExpectedKind::Html)?;
    parse_detail(&resp.text(), &page_url, static_host)
}

/// Run the gallery source for one entity into `dest_dir`.
///
/// Each listing page's images are downloaded before the next page is
/// requested. A listing page that cannot be fetched or parsed ends the crawl
/// and marks the report aborted; files already saved stay.
pub fn scrape(
    fetcher: &dyn Fetcher,
    config: &ZerochanConfig,
    entity: &Entity,
    dest_dir: &Path,
    dedup: &mut DedupSet,
) -> SourceReport {
    log::info!(
        "[{}] Scraping for '{}' (search: {})",
        Source::Zerochan,
        entity.name,
        zerochan_search_term(entity)
    );

    let mut report = SourceReport::new(Source::Zerochan);
    let half_delay = config.request_delay() / 2;

    for page in 1..=config.max_pages {
        if page > 1 {
            fetcher.pause(config.request_delay());
        }
        let listing_url = zerochan_search_url(&config.base_url, entity, page);
        log::info!("  Scraping page {}: {}", page, listing_url);

        let listing = parse_url(&listing_url).and_then(|page_url| {
            let resp = fetch(fetcher, &listing_url, &[], ExpectedKind::Html)?;
            parse_listing(&resp.text(), &page_url)
        });
        let listing = match listing {
            Ok(listing) => listing,
            Err(ScrapeError::Status { status: 404, .. }) if page > 1 => {
                log::info!("  Page {} does not exist. Stopping.", page);
                break;
            }
            Err(e) => {
                log::warn!(
                    "  Error fetching gallery page {} for {}: {}",
                    page,
                    entity.name,
                    e
                );
                report.aborted = Some(format!("page {}: {}", page, e));
                break;
            }
        };
        if listing.thumbnails == 0 {
            log::info!("  No more image links found on page {}. Stopping.", page);
            break;
        }

        let mut urls: Vec<String> = Vec::new();
        for detail_page in &listing.detail_pages {
            fetcher.pause(config.request_delay());
            match detail_image(fetcher, detail_page, &config.static_host) {
                Ok(Some(url)) if !urls.contains(&url) => urls.push(url),
                Ok(Some(_)) => {}
                Ok(None) => log::debug!("    -> Could not find full-res link on {}", detail_page),
                Err(e) => log::warn!("    -> Error fetching image page {}: {}", detail_page, e),
            }
        }

        log::info!(
            "  [{} page {}] Found {} potential image URLs. Downloading...",
            Source::Zerochan,
            page,
            urls.len()
        );
        report.candidates += urls.len();
        let before = report.downloaded;
        for url in urls {
            let candidate = Candidate {
                url,
                source: Source::Zerochan,
                entity: entity.name.clone(),
                context: listing_url.clone(),
            };
            let outcome = acquire_candidate(fetcher, &candidate, dest_dir, dedup, half_delay);
            if matches!(outcome, Acquired::Downloaded(_)) {
                fetcher.pause(config.request_delay());
            }
            report.record(&outcome);
        }
        log::info!(
            "  [{} page {}] Downloaded {} new images.",
            Source::Zerochan,
            page,
            report.downloaded - before
        );
    }

    log::info!(
        "  [{}] Total downloaded {} new images for '{}'.",
        Source::Zerochan,
        report.downloaded,
        entity.name
    );
    report
}

#[cfg(test)]
#[path = "tests/zerochan_tests.rs"]
mod tests;
