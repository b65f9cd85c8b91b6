//! Tag-search image board: paginated JSON post search, then one download per
//! post named `{id}.{ext}`.

use std::path::Path;

use dexgrab_core::{Entity, Source, danbooru_search_tags, danbooru_tag};
use serde_json::Value;

use crate::client::{ExpectedKind, Fetcher, fetch};
use crate::config::DanbooruConfig;
use crate::download::acquire_post;
use crate::error::ScrapeError;
use crate::pagination::{FailureKind, FailureVerdict, PageVerdict, Pagination, Termination};
use crate::report::SourceReport;

/// Extension used when neither the record nor its URL provides one.
const DEFAULT_EXTENSION: &str = "jpg";

/// A post eligible for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub id: u64,
    pub file_url: String,
    /// Extension without the dot.
    pub file_ext: String,
}

impl PostRecord {
    /// Validate a raw API record.
    ///
    /// The record needs a numeric `id` and a non-empty `file_url`. The
    /// extension comes from `file_ext`, then the URL path, then `jpg`.
    pub fn from_value(value: &Value) -> Result<Self, ScrapeError> {
        let id = value.get("id").and_then(Value::as_u64);
        let file_url = value
            .get("file_url")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty());

        let (id, file_url) = match (id, file_url) {
            (Some(id), Some(url)) => (id, url.to_string()),
            (None, url) => {
                return Err(ScrapeError::malformed(format!(
                    "post with URL {} has no ID",
                    url.unwrap_or("N/A")
                )));
            }
            (Some(id), None) => {
                return Err(ScrapeError::malformed(format!(
                    "post ID {} has no file_url",
                    id
                )));
            }
        };

        let meta_ext = value
            .get("file_ext")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let file_ext = post_extension(meta_ext, &file_url);

        Ok(Self {
            id,
            file_url,
            file_ext,
        })
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.id, self.file_ext)
    }
}

/// Resolve a post's file extension (without dot).
///
/// Only ASCII alphanumeric extensions are used, so a hostile `file_ext`
/// cannot steer the `{id}.{ext}` path outside the entity directory.
pub fn post_extension(meta_ext: &str, file_url: &str) -> String {
    let meta_ext = meta_ext.trim().trim_start_matches('.');
    if is_plain_extension(meta_ext) {
        return meta_ext.to_lowercase();
    }
    if !meta_ext.is_empty() {
        log::debug!("Ignoring file_ext '{}' for {}", meta_ext, file_url);
    }

    let path = reqwest::Url::parse(file_url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| file_url.to_string());
    Path::new(&path)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| is_plain_extension(e))
        .map(str::to_lowercase)
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

fn is_plain_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Decode one API page: a JSON array of post objects.
pub fn parse_page(body: &[u8]) -> Result<Vec<Value>, ScrapeError> {
    Ok(serde_json::from_slice(body)?)
}

/// Result of the metadata phase for one tag.
#[derive(Debug, Clone)]
pub struct PostBatch {
    pub records: Vec<PostRecord>,
    /// Raw records received, valid or not (capped at the target).
    pub metadata_count: usize,
    pub malformed: usize,
    pub termination: Termination,
}

fn failure_kind(err: &ScrapeError) -> FailureKind {
    if err.is_rate_limited() {
        FailureKind::RateLimited
    } else if err.is_network() {
        FailureKind::Network
    } else {
        FailureKind::Other
    }
}

/// Fetch post metadata for `tag` until the target count, the end of results,
/// the page ceiling or the retry limit.
pub fn fetch_posts(fetcher: &dyn Fetcher, config: &DanbooruConfig, tag: &str) -> PostBatch {
    let search_tags = danbooru_search_tags(tag, &config.safety_filter);
    log::info!("  Fetching posts for tags: '{}'", search_tags);

    let mut pager = Pagination::new(config.max_images_per_entity, config.max_attempts);
    let mut raw: Vec<Value> = Vec::new();

    while let Some(request) = pager.next_request() {
        log::info!("  Requesting page {} for tag '{}'...", request.page, tag);
        let query = [
            ("tags", search_tags.clone()),
            ("limit", request.limit.to_string()),
            ("page", request.page.to_string()),
        ];

        fetcher.pause(config.request_delay());
        let result = fetch(fetcher, &config.api_url, &query, ExpectedKind::Json)
            .and_then(|resp| parse_page(&resp.body));

        match result {
            Ok(posts) => {
                let received = posts.len();
                raw.extend(posts);
                match pager.on_page(received) {
                    PageVerdict::Continue => log::info!(
                        "  Fetched {} posts on page {}. Total posts fetched so far: {}",
                        received,
                        request.page,
                        pager.fetched()
                    ),
                    PageVerdict::LikelyEnd => log::info!(
                        "  Fetched {} posts on page {}, fewer than requested; likely end of results",
                        received,
                        request.page
                    ),
                    PageVerdict::Finished(Termination::EndOfResults) => log::info!(
                        "  No more posts found for tag '{}' on page {}",
                        tag,
                        request.page
                    ),
                    PageVerdict::Finished(Termination::PageCeiling) => log::warn!(
                        "  Reached page limit heuristic ({}). Stopping fetch for tag '{}'",
                        pager.ceiling(),
                        tag
                    ),
                    PageVerdict::Finished(t) => log::info!("  Stopping for tag '{}': {}", tag, t),
                }
            }
            Err(e) => {
                log::warn!(
                    "  Error fetching page {} for tag '{}': {}",
                    request.page,
                    tag,
                    e
                );
                if let ScrapeError::Status { excerpt, .. } = &e {
                    log::debug!("  Response text: {}", excerpt);
                }
                match pager.on_failure(failure_kind(&e)) {
                    FailureVerdict::Retry => {}
                    FailureVerdict::RetryAfterRateLimit => {
                        log::warn!("  Rate limit hit (429)! Pausing before retrying...");
                        fetcher.pause(config.rate_limit_pause());
                    }
                    FailureVerdict::RetryAfterNetworkError => {
                        fetcher.pause(config.network_error_pause());
                    }
                    FailureVerdict::GiveUp => log::warn!(
                        "  Too many consecutive errors fetching page {}. Stopping for tag '{}'",
                        request.page,
                        tag
                    ),
                }
            }
        }
    }

    raw.truncate(config.max_images_per_entity);
    let metadata_count = raw.len();

    let mut records = Vec::with_capacity(raw.len());
    let mut malformed = 0;
    for value in &raw {
        match PostRecord::from_value(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                log::info!("  Skipping {}", e);
                malformed += 1;
            }
        }
    }

    let termination = pager
        .termination()
        .unwrap_or(Termination::TargetReached);
    log::info!(
        "Finished fetching metadata for tag '{}'. Total posts found: {}",
        tag,
        metadata_count
    );

    PostBatch {
        records,
        metadata_count,
        malformed,
        termination,
    }
}

/// Run the tag-search source for one entity into `dest_dir`.
pub fn scrape(
    fetcher: &dyn Fetcher,
    config: &DanbooruConfig,
    entity: &Entity,
    dest_dir: &Path,
) -> SourceReport {
    let tag = danbooru_tag(entity);
    log::info!("[{}] Scraping for '{}' (tag: {})", Source::Danbooru, entity.name, tag);

    let batch = fetch_posts(fetcher, config, &tag);
    let mut report = SourceReport::new(Source::Danbooru);
    report.candidates = batch.records.len();
    report.malformed = batch.malformed;
    if batch.termination.is_abnormal() {
        report.aborted = Some(batch.termination.to_string());
    }

    let total = batch.records.len();
    log::info!(
        "Found {} potential images for tag '{}'. Starting downloads...",
        total,
        tag
    );
    for (i, post) in batch.records.iter().enumerate() {
        log::debug!("  Attempting download {}/{} for tag '{}'", i + 1, total, tag);
        let outcome = acquire_post(fetcher, post, dest_dir, config.request_delay());
        report.record(&outcome);
    }

    log::info!(
        "[{}] Downloaded {}/{} images for '{}'",
        Source::Danbooru,
        report.downloaded,
        total,
        tag
    );
    report
}

#[cfg(test)]
#[path = "tests/danbooru_tests.rs"]
mod tests;
