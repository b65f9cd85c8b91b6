use std::path::PathBuf;

use dexgrab_core::Source;

use crate::download::Acquired;

/// Outcome of running one source for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: Source,
    /// Candidate URLs (or eligible post records) handed to the download engine.
    pub candidates: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Post records dropped for missing an id or file URL.
    pub malformed: usize,
    /// Set when the source stopped early because of an error.
    pub aborted: Option<String>,
}

impl SourceReport {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            candidates: 0,
            downloaded: 0,
            skipped: 0,
            failed: 0,
            malformed: 0,
            aborted: None,
        }
    }

    pub fn aborted(source: Source, reason: impl Into<String>) -> Self {
        Self {
            aborted: Some(reason.into()),
            ..Self::new(source)
        }
    }

    /// Tally one download outcome.
    pub fn record(&mut self, outcome: &Acquired) {
        match outcome {
            Acquired::Downloaded(_) => self.downloaded += 1,
            Acquired::Skipped(_) => self.skipped += 1,
            Acquired::Failed(_) => self.failed += 1,
        }
    }
}

/// Everything that happened for one entity.
#[derive(Debug, Clone)]
pub struct EntityReport {
    pub entity: String,
    pub directory: PathBuf,
    pub sources: Vec<SourceReport>,
}

impl EntityReport {
    pub fn downloaded(&self) -> usize {
        self.sources.iter().map(|s| s.downloaded).sum()
    }
}

/// Collects per-entity reports over a whole run.
#[derive(Debug, Default)]
pub struct HarvestLog {
    entities: Vec<EntityReport>,
}

impl HarvestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, report: EntityReport) {
        self.entities.push(report);
    }

    pub fn entities(&self) -> &[EntityReport] {
        &self.entities
    }

    pub fn summary(&self) -> LogSummary {
        let mut summary = LogSummary {
            entities: self.entities.len(),
            ..Default::default()
        };
        for source in self.entities.iter().flat_map(|e| &e.sources) {
            summary.candidates += source.candidates;
            summary.downloaded += source.downloaded;
            summary.skipped += source.skipped;
            summary.failed += source.failed;
            summary.malformed += source.malformed;
            if source.aborted.is_some() {
                summary.aborted_sources += 1;
            }
        }
        summary
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogSummary {
    pub entities: usize,
    pub candidates: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub malformed: usize,
    pub aborted_sources: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::SkipReason;
    use crate::error::ScrapeError;

    #[test]
    fn record_tallies_each_outcome() {
        let mut report = SourceReport::new(Source::Bulbapedia);
        report.record(&Acquired::Downloaded(PathBuf::from("a.png")));
        report.record(&Acquired::Downloaded(PathBuf::from("b.png")));
        report.record(&Acquired::Skipped(SkipReason::AlreadySeen));
        report.record(&Acquired::Failed(ScrapeError::network("reset")));
        assert_eq!(report.downloaded, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn summary_sums_across_entities() {
        let mut log = HarvestLog::new();
        for name in ["clodsire", "obstagoon"] {
            let mut wiki = SourceReport::new(Source::Bulbapedia);
            wiki.candidates = 3;
            wiki.downloaded = 2;
            wiki.skipped = 1;
            log.add(EntityReport {
                entity: name.to_string(),
                directory: PathBuf::from(name),
                sources: vec![wiki, SourceReport::aborted(Source::Zerochan, "HTTP 503")],
            });
        }

        let summary = log.summary();
        assert_eq!(summary.entities, 2);
        assert_eq!(summary.candidates, 6);
        assert_eq!(summary.downloaded, 4);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.aborted_sources, 2);
        assert_eq!(log.entities()[0].downloaded(), 2);
    }
}
