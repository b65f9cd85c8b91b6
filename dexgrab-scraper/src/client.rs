use std::io::Read;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;

use crate::error::ScrapeError;

/// How many characters of a bad response body are kept for diagnostics.
const EXCERPT_CHARS: usize = 500;

/// Bytes read from an error response; enough for [`EXCERPT_CHARS`].
pub const EXCERPT_BYTES: u64 = 4 * EXCERPT_CHARS as u64;

/// What the caller expects a response body to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedKind {
    Html,
    Json,
    Image,
}

impl ExpectedKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Html => "HTML",
            Self::Json => "application/json",
            Self::Image => "image/*",
        }
    }

    /// Check a lower-cased `Content-Type` value against this kind.
    ///
    /// HTML pages are accepted whatever they declare; wikis are not always
    /// consistent about it and the parser copes with junk.
    pub fn accepts(&self, content_type: &str) -> bool {
        match self {
            Self::Html => true,
            Self::Json => content_type.contains("application/json"),
            Self::Image => content_type.starts_with("image/"),
        }
    }
}

/// An HTTP response as handed back by a [`Fetcher`].
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    /// Lower-cased `Content-Type` header, empty when absent.
    pub content_type: String,
    /// Full body for a 2xx response of the expected kind, at most
    /// [`EXCERPT_BYTES`] for an error status, empty otherwise.
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        is_success(self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn excerpt(&self) -> String {
        self.text().chars().take(EXCERPT_CHARS).collect()
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Issues GET requests. Implementations do not throttle: callers pace their
/// own requests through [`Fetcher::pause`].
pub trait Fetcher {
    /// Perform a GET and return the response whatever its status.
    ///
    /// Status and content type come from the headers. The body is only read
    /// when the status is 2xx and `kind` accepts the content type, so a large
    /// unwanted download is dropped unread.
    fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        kind: ExpectedKind,
    ) -> Result<FetchResponse, ScrapeError>;

    /// Courtesy delay between requests.
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// GET `url` and require a 2xx status and a body of the expected kind.
pub fn fetch(
    fetcher: &dyn Fetcher,
    url: &str,
    query: &[(&str, String)],
    kind: ExpectedKind,
) -> Result<FetchResponse, ScrapeError> {
    let resp = fetcher.get(url, query, kind)?;

    if !resp.is_success() {
        let reason = reqwest::StatusCode::from_u16(resp.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown")
            .to_string();
        return Err(ScrapeError::Status {
            status: resp.status,
            reason,
            excerpt: resp.excerpt(),
        });
    }

    if !kind.accepts(&resp.content_type) {
        return Err(ScrapeError::UnexpectedContentType {
            expected: kind.label(),
            actual: resp.content_type,
        });
    }

    Ok(resp)
}

/// Blocking HTTP client sending a fixed `User-Agent` on every request.
///
/// Pages must arrive within `timeout`. Image downloads get their own, longer
/// deadline so a big file on a slow link is not cut off.
pub struct HttpClient {
    http: reqwest::blocking::Client,
    timeout: Duration,
    download_timeout: Duration,
}

impl HttpClient {
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        download_timeout: Duration,
    ) -> Result<Self, ScrapeError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            timeout,
            download_timeout,
        })
    }
}

impl Fetcher for HttpClient {
    fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        kind: ExpectedKind,
    ) -> Result<FetchResponse, ScrapeError> {
        log::debug!("GET {} {:?}", url, query);

        let deadline = match kind {
            ExpectedKind::Image => self.download_timeout,
            ExpectedKind::Html | ExpectedKind::Json => self.timeout,
        };
        let resp = self.http.get(url).query(query).timeout(deadline).send()?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();

        let body = if !is_success(status) {
            let mut excerpt = Vec::new();
            if let Err(e) = resp.take(EXCERPT_BYTES).read_to_end(&mut excerpt) {
                log::debug!("Could not read error body from {}: {}", url, e);
            }
            excerpt
        } else if kind.accepts(&content_type) {
            resp.bytes()?.to_vec()
        } else {
            log::debug!("Not reading {} body from {}", content_type, url);
            Vec::new()
        };

        Ok(FetchResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
