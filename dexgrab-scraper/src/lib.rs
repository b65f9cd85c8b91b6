pub mod bulbapedia;
pub mod client;
pub mod config;
pub mod danbooru;
pub mod download;
pub mod error;
pub mod harvest;
pub mod html;
pub mod pagination;
pub mod report;
pub mod zerochan;

#[cfg(test)]
#[path = "tests/mock_fetcher.rs"]
pub(crate) mod mock_fetcher;

pub use client::{ExpectedKind, FetchResponse, Fetcher, HttpClient, fetch};
pub use config::{
    BulbapediaConfig, DanbooruConfig, HarvestConfig, HttpConfig, ZerochanConfig, config_path,
};
pub use danbooru::PostRecord;
pub use download::{Acquired, Candidate, DedupSet, SkipReason};
pub use error::ScrapeError;
pub use harvest::{HarvestEvent, entity_directory, harvest_all, harvest_entity, run_order};
pub use pagination::{Pagination, Termination};
pub use report::{EntityReport, HarvestLog, LogSummary, SourceReport};
