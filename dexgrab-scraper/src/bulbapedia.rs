//! Encyclopedia source: species article, then one file page per linked image.
//!
//! The article yields link-wrapped images. Each link to a `/wiki/File:` page
//! is followed once to read the full-resolution URL from the page's `#file`
//! container. Thumbnails whose alt text or URL mentions the entity are kept
//! as candidates too.

use std::path::Path;

use dexgrab_core::{Entity, Source, bulbapedia_article_url};
use reqwest::Url;
use scraper::{ElementRef, Html};

use crate::client::{ExpectedKind, Fetcher, fetch};
use crate::config::BulbapediaConfig;
use crate::download::{Acquired, Candidate, DedupSet, acquire_candidate};
use crate::error::ScrapeError;
use crate::html::{parse_url, resolve, selector};
use crate::report::SourceReport;

/// Path fragment identifying file detail pages.
const FILE_PAGE_MARKER: &str = "/wiki/File:";

/// Links discovered on an article page, in document order without repeats.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArticleLinks {
    /// Inline thumbnail URLs that passed [`matches_entity`].
    pub thumbnails: Vec<String>,
    /// File detail pages to visit.
    pub file_pages: Vec<String>,
}

/// Loose relevance check for an inline thumbnail.
///
/// True when any hyphen-separated token of the entity name appears in the
/// lower-cased alt text or URL. Expect false positives (short tokens such as
/// `mega` match unrelated images) and false negatives (alt text that names
/// the species differently); the source data is free text.
pub fn matches_entity(entity_name: &str, alt: &str, url: &str) -> bool {
    let alt = alt.to_lowercase();
    let url = url.to_lowercase();
    entity_name
        .to_lowercase()
        .split('-')
        .filter(|token| !token.is_empty())
        .any(|token| alt.contains(token) || url.contains(token))
}

fn push_unique(list: &mut Vec<String>, url: String) {
    if !list.contains(&url) {
        list.push(url);
    }
}

/// Collect file pages and relevant thumbnails from an article.
pub fn parse_article(
    html: &str,
    page_url: &Url,
    entity_name: &str,
) -> Result<ArticleLinks, ScrapeError> {
    let document = Html::parse_document(html);
    let linked_images = selector("a > img")?;

    let mut links = ArticleLinks::default();
    for img in document.select(&linked_images) {
        let Some(href) = img
            .parent()
            .and_then(ElementRef::wrap)
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };
        let Some(file_page) = resolve(page_url, href) else {
            continue;
        };
        if !file_page.contains(FILE_PAGE_MARKER) {
            continue;
        }

        if let Some(thumb) = img.value().attr("src").and_then(|src| resolve(page_url, src)) {
            let alt = img.value().attr("alt").unwrap_or_default();
            if matches_entity(entity_name, alt, &thumb) {
                push_unique(&mut links.thumbnails, thumb);
            }
        }
        push_unique(&mut links.file_pages, file_page);
    }
    Ok(links)
}

/// Full-resolution image URL from a file detail page, if it is served from
/// `media_host`.
pub fn parse_file_page(
    html: &str,
    page_url: &Url,
    media_host: &str,
) -> Result<Option<String>, ScrapeError> {
    let document = Html::parse_document(html);
    let file_image = selector("div#file a img")?;

    let Some(src) = document
        .select(&file_image)
        .next()
        .and_then(|img| img.value().attr("src"))
    else {
        return Ok(None);
    };
    let Some(url) = resolve(page_url, src) else {
        return Ok(None);
    };

    let on_media_host = Url::parse(&url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.eq_ignore_ascii_case(media_host)))
        .unwrap_or(false);
    Ok(on_media_host.then_some(url))
}

/// Visit every file page and gather candidates, thumbnails first.
///
/// A file page that cannot be fetched or parsed is logged and skipped.
fn collect_candidates(
    fetcher: &dyn Fetcher,
    config: &BulbapediaConfig,
    links: ArticleLinks,
) -> Vec<String> {
    let mut urls = links.thumbnails;
    for file_page in &links.file_pages {
        log::info!("  Checking file page: {}", file_page);
        fetcher.pause(config.request_delay());

        let full_res = parse_url(file_page).and_then(|page_url| {
            let resp = fetch(fetcher, file_page, &[], ExpectedKind::Html)?;
            parse_file_page(&resp.text(), &page_url, &config.media_host)
        });
        match full_res {
            Ok(Some(url)) => {
                log::info!("    -> Found potential full-res: {}", url);
                push_unique(&mut urls, url);
            }
            Ok(None) => log::debug!("    -> No full-res image on {}", file_page),
            Err(e) => log::warn!("    -> Error fetching file page {}: {}", file_page, e),
        }
    }
    urls
}

/// Run the encyclopedia source for one entity into `dest_dir`.
///
/// Fails only when the article itself cannot be fetched or parsed; errors on
/// individual file pages or downloads are tallied in the report.
pub fn scrape(
    fetcher: &dyn Fetcher,
    config: &BulbapediaConfig,
    entity: &Entity,
    dest_dir: &Path,
    dedup: &mut DedupSet,
) -> Result<SourceReport, ScrapeError> {
    log::info!("[{}] Scraping for '{}'...", Source::Bulbapedia, entity.name);
    let article_url = bulbapedia_article_url(&config.base_url, entity);
    log::info!("  Article URL: {}", article_url);

    let page_url = parse_url(&article_url)?;
    let resp = fetch(fetcher, &article_url, &[], ExpectedKind::Html)?;
    let links = parse_article(&resp.text(), &page_url, &entity.name)?;
    log::debug!(
        "  {} file pages, {} matching thumbnails",
        links.file_pages.len(),
        links.thumbnails.len()
    );

    let urls = collect_candidates(fetcher, config, links);
    log::info!(
        "  [{}] Found {} potential image URLs. Downloading...",
        Source::Bulbapedia,
        urls.len()
    );

    let mut report = SourceReport::new(Source::Bulbapedia);
    report.candidates = urls.len();
    let half_delay = config.request_delay() / 2;
    for url in urls {
        let candidate = Candidate {
            url,
            source: Source::Bulbapedia,
            entity: entity.name.clone(),
            context: article_url.clone(),
        };
        let outcome = acquire_candidate(fetcher, &candidate, dest_dir, dedup, half_delay);
        if matches!(outcome, Acquired::Downloaded(_)) {
            fetcher.pause(config.request_delay());
        }
        report.record(&outcome);
    }

    log::info!(
        "  [{}] Downloaded {} new images for '{}'.",
        Source::Bulbapedia,
        report.downloaded,
        entity.name
    );
    Ok(report)
}

#[cfg(test)]
#[path = "tests/bulbapedia_tests.rs"]
mod tests;
