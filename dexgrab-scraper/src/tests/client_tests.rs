use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::{Duration, Instant};

use super::*;
use crate::danbooru::PostRecord;
use crate::download::{Acquired, SkipReason, acquire_post};

/// Serve one connection on localhost: send `head` (status line and headers),
/// then `body`, then hold the socket open for `linger` without finishing.
fn serve_once(head: &'static str, body: &'static [u8], linger: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(body);
        let _ = stream.flush();
        thread::sleep(linger);
    });
    format!("http://{addr}")
}

fn client() -> HttpClient {
    HttpClient::new("dexgrab-test", Duration::from_secs(1), Duration::from_secs(1)).unwrap()
}

#[test]
fn stalled_video_is_skipped_without_reading_body() {
    let base = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Type: video/mp4\r\nContent-Length: 10000000\r\n\r\n",
        b"\x00\x00\x00\x18ftypmp42",
        Duration::from_secs(5),
    );
    let post = PostRecord {
        id: 77,
        file_url: format!("{base}/77.mp4"),
        file_ext: "mp4".to_string(),
    };
    let dir = tempfile::tempdir().unwrap();

    let started = Instant::now();
    let result = acquire_post(&client(), &post, dir.path(), Duration::ZERO);

    assert!(
        matches!(&result, Acquired::Skipped(SkipReason::NotAnImage(ct)) if ct == "video/mp4"),
        "got {result:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(!dir.path().join("77.mp4").exists());
}

#[test]
fn image_body_is_read_in_full() {
    let base = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Type: image/PNG\r\nContent-Length: 9\r\nConnection: close\r\n\r\n",
        b"png-bytes",
        Duration::ZERO,
    );

    let resp = fetch(&client(), &format!("{base}/a.png"), &[], ExpectedKind::Image).unwrap();

    assert_eq!(resp.content_type, "image/png");
    assert_eq!(resp.body, b"png-bytes");
}

#[test]
fn error_status_keeps_excerpt() {
    let base = serve_once(
        "HTTP/1.1 503 Service Unavailable\r\nContent-Type: text/plain\r\nContent-Length: 12\r\nConnection: close\r\n\r\n",
        b"come back la",
        Duration::ZERO,
    );

    let err = fetch(&client(), &format!("{base}/posts.json"), &[], ExpectedKind::Json).unwrap_err();

    match err {
        ScrapeError::Status {
            status, excerpt, ..
        } => {
            assert_eq!(status, 503);
            assert_eq!(excerpt, "come back la");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[test]
fn kinds_accept_expected_content_types() {
    assert!(ExpectedKind::Image.accepts("image/webp"));
    assert!(!ExpectedKind::Image.accepts("video/mp4"));
    assert!(ExpectedKind::Json.accepts("application/json; charset=utf-8"));
    assert!(!ExpectedKind::Json.accepts("text/html"));
    assert!(ExpectedKind::Html.accepts(""));
}
