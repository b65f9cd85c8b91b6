//! Dedup & download engine.
//!
//! Two strategies share the same write path:
//! - URL-hash naming (wiki and gallery sources) deduplicates against a
//!   per-entity in-memory [`DedupSet`].
//! - Post-id naming (tag-search source) deduplicates against files already on
//!   disk, which makes it durable across runs.
//!
//! Either way a file is only written after the response declared an image
//! content type, and an existing file is never overwritten.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use dexgrab_core::{Source, sanitize_filename};

use crate::client::{ExpectedKind, Fetcher, fetch};
use crate::danbooru::PostRecord;
use crate::error::ScrapeError;

/// Extensions accepted verbatim from a URL path.
const KNOWN_IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Hex characters of the URL digest kept in generated filenames.
const URL_HASH_LEN: usize = 10;

/// URLs already downloaded while processing the current entity.
///
/// Created fresh for every entity and shared by all URL-hash sources for
/// that entity, so the same picture linked from two sources is fetched once.
#[derive(Debug, Default)]
pub struct DedupSet {
    seen: HashSet<String>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.seen.insert(url.into())
    }

    pub(crate) fn len(&self) -> usize {
        self.seen.len()
    }
}

/// A URL believed to reference a downloadable image, with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub source: Source,
    pub entity: String,
    /// Page the URL was discovered on.
    pub context: String,
}

/// Outcome of one acquisition attempt.
#[derive(Debug)]
pub enum Acquired {
    Downloaded(PathBuf),
    Skipped(SkipReason),
    Failed(ScrapeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// URL is already in the per-entity dedup set.
    AlreadySeen,
    /// Target file exists.
    AlreadyOnDisk(PathBuf),
    /// Response content type was not `image/*`.
    NotAnImage(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadySeen => write!(f, "already downloaded"),
            Self::AlreadyOnDisk(path) => write!(f, "file already exists: {}", path.display()),
            Self::NotAnImage(ct) if ct.is_empty() => write!(f, "no content type"),
            Self::NotAnImage(ct) => write!(f, "non-image content ({})", ct),
        }
    }
}

/// Pick a file extension (with leading dot) for an image.
///
/// The URL's own suffix wins when it is a known image type, then the
/// content type, then `.jpg`.
pub fn image_extension(url: &str, content_type: &str) -> &'static str {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    if let Some(ext) = Path::new(&path).extension().and_then(|e| e.to_str()) {
        let dotted = format!(".{}", ext.to_lowercase());
        if let Some(known) = KNOWN_IMAGE_EXTENSIONS.iter().find(|k| **k == dotted) {
            return *known;
        }
    }

    if content_type.contains("jpeg") || content_type.contains("jpg") {
        ".jpg"
    } else if content_type.contains("png") {
        ".png"
    } else if content_type.contains("gif") {
        ".gif"
    } else if content_type.contains("webp") {
        ".webp"
    } else {
        ".jpg"
    }
}

/// `{prefix}_{entity}_{first 10 hex of md5(url)}{ext}`.
pub fn url_hash_file_name(source: Source, entity: &str, url: &str, extension: &str) -> String {
    let digest = format!("{:x}", md5::compute(url.as_bytes()));
    format!(
        "{}_{}_{}{}",
        source.file_prefix(),
        sanitize_filename(entity),
        &digest[..URL_HASH_LEN],
        extension
    )
}

/// Download a wiki/gallery candidate into `dest_dir`.
///
/// `pre_delay` is paused before the request, never for a dedup hit.
pub fn acquire_candidate(
    fetcher: &dyn Fetcher,
    candidate: &Candidate,
    dest_dir: &Path,
    dedup: &mut DedupSet,
    pre_delay: Duration,
) -> Acquired {
    if dedup.contains(&candidate.url) {
        log::debug!("    -> Skipping duplicate: {}", candidate.url);
        return Acquired::Skipped(SkipReason::AlreadySeen);
    }

    log::info!("    -> Attempting to download: {}", candidate.url);
    fetcher.pause(pre_delay);

    let resp = match fetch(fetcher, &candidate.url, &[], ExpectedKind::Image) {
        Ok(resp) => resp,
        Err(ScrapeError::UnexpectedContentType { actual, .. }) => {
            let reason = SkipReason::NotAnImage(actual);
            log::info!("    -> Skipped {}: {}", candidate.url, reason);
            return Acquired::Skipped(reason);
        }
        Err(e) => {
            log::warn!(
                "    -> Error downloading {} (found on {}): {}",
                candidate.url,
                candidate.context,
                e
            );
            return Acquired::Failed(e);
        }
    };

    let extension = image_extension(&candidate.url, &resp.content_type);
    let filename = url_hash_file_name(candidate.source, &candidate.entity, &candidate.url, extension);
    let path = dest_dir.join(&filename);

    match write_new_file(&path, &resp.body) {
        Ok(true) => {
            log::info!("    -> Saved: {}", filename);
            dedup.insert(candidate.url.clone());
            Acquired::Downloaded(path)
        }
        Ok(false) => {
            dedup.insert(candidate.url.clone());
            Acquired::Skipped(SkipReason::AlreadyOnDisk(path))
        }
        Err(e) => {
            log::warn!(
                "    -> Error saving {} (found on {}): {}",
                candidate.url,
                candidate.context,
                e
            );
            Acquired::Failed(e)
        }
    }
}

/// Download a tag-search post to `{dest_dir}/{id}.{ext}`.
///
/// An existing file at that path means the post was fetched by an earlier
/// run; no request is made.
pub fn acquire_post(
    fetcher: &dyn Fetcher,
    post: &PostRecord,
    dest_dir: &Path,
    pre_delay: Duration,
) -> Acquired {
    let path = dest_dir.join(post.file_name());
    if path.exists() {
        log::info!(
            "  Skipping post ID {} - File already exists: {}",
            post.id,
            path.display()
        );
        return Acquired::Skipped(SkipReason::AlreadyOnDisk(path));
    }

    log::info!("  Downloading Post ID {} -> {}...", post.id, path.display());
    fetcher.pause(pre_delay);

    let resp = match fetch(fetcher, &post.file_url, &[], ExpectedKind::Image) {
        Ok(resp) => resp,
        Err(ScrapeError::UnexpectedContentType { actual, .. }) => {
            let reason = SkipReason::NotAnImage(actual);
            log::info!("  Skipped post ID {}: {}", post.id, reason);
            return Acquired::Skipped(reason);
        }
        Err(e) => {
            log::warn!(
                "  Error downloading {} (Post ID {}): {}",
                post.file_url,
                post.id,
                e
            );
            return Acquired::Failed(e);
        }
    };

    match write_new_file(&path, &resp.body) {
        Ok(true) => Acquired::Downloaded(path),
        Ok(false) => Acquired::Skipped(SkipReason::AlreadyOnDisk(path)),
        Err(e) => {
            log::warn!("  Error saving image for Post ID {}: {}", post.id, e);
            Acquired::Failed(e)
        }
    }
}

/// Create `path` and write `bytes` into it.
///
/// Returns `Ok(false)` without touching anything if the file already exists.
/// A failed write removes whatever was partially written.
fn write_new_file(path: &Path, bytes: &[u8]) -> Result<bool, ScrapeError> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(ScrapeError::PartialWrite {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    if let Err(e) = file.write_all(bytes).and_then(|()| file.flush()) {
        drop(file);
        if let Err(rm) = std::fs::remove_file(path) {
            log::debug!("Could not remove partial file {}: {}", path.display(), rm);
        }
        return Err(ScrapeError::PartialWrite {
            path: path.to_path_buf(),
            source: e,
        });
    }
    Ok(true)
}

#[cfg(test)]
#[path = "tests/download_tests.rs"]
mod tests;
