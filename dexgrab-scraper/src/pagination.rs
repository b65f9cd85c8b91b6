//! Page-by-page fetch controller for the tag-search API.
//!
//! The controller owns the loop state (`page`, records fetched so far,
//! consecutive failures) and decides what happens next; the caller performs
//! the requests and reports back. Keeping the decisions here makes every
//! termination condition testable without a network.

/// Largest page size the API accepts.
pub const API_MAX_LIMIT: usize = 200;

/// One page to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub limit: usize,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// An empty page came back.
    EndOfResults,
    /// Enough records were fetched.
    TargetReached,
    /// Too many consecutive failures on the same page; partial results kept.
    TooManyFailures,
    /// The page-count ceiling was passed.
    PageCeiling,
}

impl Termination {
    /// Normal ends keep the run quiet; the others are worth a warning.
    pub fn is_abnormal(&self) -> bool {
        matches!(self, Self::TooManyFailures | Self::PageCeiling)
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndOfResults => write!(f, "end of results"),
            Self::TargetReached => write!(f, "target count reached"),
            Self::TooManyFailures => write!(f, "too many consecutive errors"),
            Self::PageCeiling => write!(f, "page limit heuristic reached"),
        }
    }
}

/// Failure categories that change the retry pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// HTTP 429.
    RateLimited,
    /// Connection or timeout error.
    Network,
    /// Bad status, wrong content type, undecodable body.
    Other,
}

/// What the caller does after a successful page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVerdict {
    Continue,
    /// Fewer records than requested: probably the last page. The loop keeps
    /// going and the next (empty) page confirms it.
    LikelyEnd,
    Finished(Termination),
}

/// What the caller does after a failed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureVerdict {
    /// Retry the same page right away (after the usual request delay).
    Retry,
    /// Retry the same page after the extended rate-limit pause.
    RetryAfterRateLimit,
    /// Retry the same page after the network-error pause.
    RetryAfterNetworkError,
    GiveUp,
}

#[derive(Debug, Clone)]
pub struct Pagination {
    target: usize,
    max_attempts: u32,
    page_ceiling: u32,
    page: u32,
    fetched: usize,
    failures: u32,
    last_limit: usize,
    termination: Option<Termination>,
}

impl Pagination {
    /// Controller for fetching up to `target` records, giving up on a page
    /// after `max_attempts` consecutive failures.
    pub fn new(target: usize, max_attempts: u32) -> Self {
        Self {
            target,
            max_attempts: max_attempts.max(1),
            page_ceiling: page_ceiling(target),
            page: 1,
            fetched: 0,
            failures: 0,
            last_limit: 0,
            termination: None,
        }
    }

    /// The next page to request, or `None` once the loop is over.
    pub fn next_request(&mut self) -> Option<PageRequest> {
        if self.termination.is_some() {
            return None;
        }
        if self.fetched >= self.target {
            self.termination = Some(Termination::TargetReached);
            return None;
        }
        let limit = API_MAX_LIMIT.min(self.target - self.fetched);
        self.last_limit = limit;
        Some(PageRequest {
            page: self.page,
            limit,
        })
    }

    /// Record a successfully decoded page holding `received` records.
    pub fn on_page(&mut self, received: usize) -> PageVerdict {
        self.failures = 0;

        if received == 0 {
            return self.finish(Termination::EndOfResults);
        }

        self.fetched += received;
        self.page += 1;

        if self.fetched >= self.target {
            return self.finish(Termination::TargetReached);
        }
        if self.page > self.page_ceiling {
            return self.finish(Termination::PageCeiling);
        }
        if received < self.last_limit {
            PageVerdict::LikelyEnd
        } else {
            PageVerdict::Continue
        }
    }

    /// Record a failed attempt at the current page. The page is not advanced.
    pub fn on_failure(&mut self, kind: FailureKind) -> FailureVerdict {
        self.failures += 1;
        if self.failures >= self.max_attempts {
            self.termination = Some(Termination::TooManyFailures);
            return FailureVerdict::GiveUp;
        }
        match kind {
            FailureKind::RateLimited => FailureVerdict::RetryAfterRateLimit,
            FailureKind::Network => FailureVerdict::RetryAfterNetworkError,
            FailureKind::Other => FailureVerdict::Retry,
        }
    }

    fn finish(&mut self, termination: Termination) -> PageVerdict {
        self.termination = Some(termination);
        PageVerdict::Finished(termination)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Records received so far (metadata only, before validation).
    pub fn fetched(&self) -> usize {
        self.fetched
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn ceiling(&self) -> u32 {
        self.page_ceiling
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }
}

/// Runaway guard: one page per hundred requested records plus fifty.
pub fn page_ceiling(target: usize) -> u32 {
    u32::try_from(target / 100)
        .unwrap_or(u32::MAX)
        .saturating_add(50)
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
