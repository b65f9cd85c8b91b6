use super::*;
use crate::mock_fetcher::{self, MockFetcher};

const IMG: &str = "https://archives.bulbagarden.net/media/upload/a/b/0980Clodsire.png";

fn candidate(url: &str) -> Candidate {
    Candidate {
        url: url.to_string(),
        source: Source::Bulbapedia,
        entity: "clodsire".to_string(),
        context: "https://bulbapedia.test/wiki/Clodsire_(Pok%C3%A9mon)".to_string(),
    }
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn extension_from_url_suffix() {
    assert_eq!(image_extension(IMG, "image/jpeg"), ".png");
    assert_eq!(image_extension("https://x.test/a/B.JPEG?x=1", ""), ".jpeg");
}

#[test]
fn extension_from_content_type_when_url_has_none() {
    assert_eq!(image_extension("https://x.test/thumb.php?f=1", "image/webp"), ".webp");
    assert_eq!(image_extension("https://x.test/file", "image/gif"), ".gif");
    assert_eq!(image_extension("https://x.test/file.svg", "image/png"), ".png");
}

#[test]
fn extension_defaults_to_jpg() {
    assert_eq!(image_extension("https://x.test/file", "image/x-unknown"), ".jpg");
}

#[test]
fn url_hash_file_name_layout() {
    let name = url_hash_file_name(Source::Bulbapedia, "clodsire", IMG, ".png");
    let digest = format!("{:x}", md5::compute(IMG.as_bytes()));
    assert_eq!(name, format!("bulbapedia_clodsire_{}.png", &digest[..10]));
}

#[test]
fn different_urls_get_different_names() {
    let a = url_hash_file_name(Source::Zerochan, "clodsire", "https://s.test/1.png", ".png");
    let b = url_hash_file_name(Source::Zerochan, "clodsire", "https://s.test/2.png", ".png");
    assert_ne!(a, b);
}

#[test]
fn downloads_and_records_url() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new();
    fetcher.respond(IMG, mock_fetcher::image("image/png", b"\x89PNG"));
    let mut dedup = DedupSet::new();

    let outcome = acquire_candidate(
        &fetcher,
        &candidate(IMG),
        dir.path(),
        &mut dedup,
        Duration::from_millis(1000),
    );

    let Acquired::Downloaded(path) = outcome else {
        panic!("expected download, got {outcome:?}");
    };
    assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG");
    assert!(dedup.contains(IMG));
    assert_eq!(fetcher.pauses(), vec![Duration::from_millis(1000)]);
}

#[test]
fn seen_url_is_skipped_without_request() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new();
    let mut dedup = DedupSet::new();
    dedup.insert(IMG);

    let outcome = acquire_candidate(&fetcher, &candidate(IMG), dir.path(), &mut dedup, Duration::ZERO);

    assert!(matches!(outcome, Acquired::Skipped(SkipReason::AlreadySeen)));
    assert!(fetcher.requests().is_empty());
    assert!(fetcher.pauses().is_empty());
}

#[test]
fn non_image_is_skipped_and_nothing_written() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new();
    fetcher.respond(IMG, mock_fetcher::html("<html>not found</html>"));
    let mut dedup = DedupSet::new();

    let outcome = acquire_candidate(&fetcher, &candidate(IMG), dir.path(), &mut dedup, Duration::ZERO);

    assert!(matches!(outcome, Acquired::Skipped(SkipReason::NotAnImage(_))));
    assert!(files_in(dir.path()).is_empty());
    assert!(!dedup.contains(IMG));
}

#[test]
fn missing_content_type_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new();
    fetcher.respond(IMG, mock_fetcher::response(200, "", b"raw"));
    let mut dedup = DedupSet::new();

    let outcome = acquire_candidate(&fetcher, &candidate(IMG), dir.path(), &mut dedup, Duration::ZERO);

    assert!(matches!(outcome, Acquired::Skipped(SkipReason::NotAnImage(ref ct)) if ct.is_empty()));
    assert!(files_in(dir.path()).is_empty());
}

#[test]
fn http_error_is_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new();
    fetcher.respond(IMG, mock_fetcher::status(503));
    let mut dedup = DedupSet::new();

    let outcome = acquire_candidate(&fetcher, &candidate(IMG), dir.path(), &mut dedup, Duration::ZERO);

    assert!(matches!(
        outcome,
        Acquired::Failed(ScrapeError::Status { status: 503, .. })
    ));
    assert!(files_in(dir.path()).is_empty());
}

#[test]
fn existing_file_is_never_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new();
    fetcher.respond(IMG, mock_fetcher::image("image/png", b"new"));
    let name = url_hash_file_name(Source::Bulbapedia, "clodsire", IMG, ".png");
    std::fs::write(dir.path().join(&name), b"old").unwrap();
    let mut dedup = DedupSet::new();

    let outcome = acquire_candidate(&fetcher, &candidate(IMG), dir.path(), &mut dedup, Duration::ZERO);

    assert!(matches!(outcome, Acquired::Skipped(SkipReason::AlreadyOnDisk(_))));
    assert_eq!(std::fs::read(dir.path().join(&name)).unwrap(), b"old");
}

#[test]
fn write_into_missing_directory_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone");
    let fetcher = MockFetcher::new();
    fetcher.respond(IMG, mock_fetcher::image("image/png", b"data"));
    let mut dedup = DedupSet::new();

    let outcome = acquire_candidate(&fetcher, &candidate(IMG), &missing, &mut dedup, Duration::ZERO);

    assert!(matches!(outcome, Acquired::Failed(ScrapeError::PartialWrite { .. })));
    assert!(!dedup.contains(IMG));
}

#[test]
fn post_download_rejects_non_image() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new();
    fetcher.respond("https://cdn.test/9.png", mock_fetcher::json("{}"));
    let post = PostRecord {
        id: 9,
        file_url: "https://cdn.test/9.png".to_string(),
        file_ext: "png".to_string(),
    };

    let outcome = acquire_post(&fetcher, &post, dir.path(), Duration::ZERO);

    assert!(matches!(outcome, Acquired::Skipped(SkipReason::NotAnImage(_))));
    assert!(!dir.path().join("9.png").exists());
}

#[test]
fn video_post_is_skipped_and_body_left_unread() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new();
    fetcher.respond(
        "https://cdn.test/12.mp4",
        mock_fetcher::response(200, "video/mp4", &[0u8; 4096]),
    );
    fetcher.respond("https://cdn.test/13.png", mock_fetcher::image("image/png", b"png"));
    let video = PostRecord {
        id: 12,
        file_url: "https://cdn.test/12.mp4".to_string(),
        file_ext: "mp4".to_string(),
    };
    let still = PostRecord {
        id: 13,
        file_url: "https://cdn.test/13.png".to_string(),
        file_ext: "png".to_string(),
    };

    let outcome = acquire_post(&fetcher, &video, dir.path(), Duration::ZERO);
    assert!(
        matches!(&outcome, Acquired::Skipped(SkipReason::NotAnImage(ct)) if ct == "video/mp4")
    );
    assert!(fetcher.bodies_read().is_empty());

    let outcome = acquire_post(&fetcher, &still, dir.path(), Duration::ZERO);
    assert!(matches!(outcome, Acquired::Downloaded(_)));
    assert_eq!(fetcher.bodies_read(), vec!["https://cdn.test/13.png".to_string()]);
    assert_eq!(files_in(dir.path()), vec!["13.png".to_string()]);
}

#[test]
fn post_download_failure_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new();
    fetcher.fail("https://cdn.test/9.png", "timed out");
    let post = PostRecord {
        id: 9,
        file_url: "https://cdn.test/9.png".to_string(),
        file_ext: "png".to_string(),
    };

    let outcome = acquire_post(&fetcher, &post, dir.path(), Duration::ZERO);

    assert!(matches!(outcome, Acquired::Failed(ScrapeError::Network(_))));
    assert!(files_in(dir.path()).is_empty());
}
