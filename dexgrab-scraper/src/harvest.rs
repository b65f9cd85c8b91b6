//! Per-entity orchestration.
//!
//! Entities run strictly one after another. For each one the output
//! directory is created, a fresh [`DedupSet`] is shared by the URL-hash
//! sources, and the selected sources run in a fixed order.

use std::path::{Path, PathBuf};

use dexgrab_core::{Entity, Source, entity_dir_name};

use crate::client::Fetcher;
use crate::config::HarvestConfig;
use crate::download::DedupSet;
use crate::error::ScrapeError;
use crate::report::{EntityReport, HarvestLog, SourceReport};
use crate::{bulbapedia, danbooru, zerochan};

/// Progress events emitted during a run, consumed by the CLI.
#[derive(Debug, Clone)]
pub enum HarvestEvent {
    /// The run is about to start.
    Started { total: usize },
    /// An entity has started; its directory exists.
    EntityStarted {
        index: usize,
        entity: String,
        directory: PathBuf,
    },
    /// One source finished for an entity.
    SourceFinished {
        index: usize,
        entity: String,
        report: SourceReport,
    },
    /// All sources finished for an entity.
    EntityFinished { index: usize, report: EntityReport },
    /// All entities processed.
    Done,
}

/// Directory an entity's images are written to.
pub fn entity_directory(output_dir: &Path, entity: &Entity) -> PathBuf {
    output_dir.join(entity_dir_name(entity))
}

/// Put `sources` in run order and drop repeats.
pub fn run_order(sources: &[Source]) -> Vec<Source> {
    Source::all()
        .iter()
        .copied()
        .filter(|s| sources.contains(s))
        .collect()
}

fn run_source(
    fetcher: &dyn Fetcher,
    config: &HarvestConfig,
    source: Source,
    entity: &Entity,
    directory: &Path,
    dedup: &mut DedupSet,
) -> SourceReport {
    match source {
        Source::Bulbapedia => {
            bulbapedia::scrape(fetcher, &config.bulbapedia, entity, directory, dedup)
                .unwrap_or_else(|e| {
                    log::warn!(
                        "  Error fetching {} page for {}: {}",
                        source.display_name(),
                        entity.name,
                        e
                    );
                    SourceReport::aborted(source, e.to_string())
                })
        }
        Source::Zerochan => zerochan::scrape(fetcher, &config.zerochan, entity, directory, dedup),
        Source::Danbooru => danbooru::scrape(fetcher, &config.danbooru, entity, directory),
    }
}

/// Run every selected source for one entity.
///
/// Only failing to create the entity directory is an error; source failures
/// end up in the returned report.
pub fn harvest_entity(
    fetcher: &dyn Fetcher,
    config: &HarvestConfig,
    entity: &Entity,
    sources: &[Source],
    index: usize,
    on_event: &mut dyn FnMut(HarvestEvent),
) -> Result<EntityReport, ScrapeError> {
    let directory = entity_directory(&config.output_dir, entity);
    if !directory.is_dir() {
        std::fs::create_dir_all(&directory)?;
        log::info!("Created directory for {}: {}", entity.name, directory.display());
    }
    on_event(HarvestEvent::EntityStarted {
        index,
        entity: entity.name.clone(),
        directory: directory.clone(),
    });

    let mut dedup = DedupSet::new();
    let mut reports = Vec::new();
    for source in run_order(sources) {
        let report = run_source(fetcher, config, source, entity, &directory, &mut dedup);
        on_event(HarvestEvent::SourceFinished {
            index,
            entity: entity.name.clone(),
            report: report.clone(),
        });
        reports.push(report);
    }
    log::debug!("{} distinct URLs downloaded for {}", dedup.len(), entity.name);

    Ok(EntityReport {
        entity: entity.name.clone(),
        directory,
        sources: reports,
    })
}

/// Run the configured entities through the selected sources.
///
/// Pauses `entity_delay` between entities. Fails only on filesystem errors
/// creating the output directories.
pub fn harvest_all(
    fetcher: &dyn Fetcher,
    config: &HarvestConfig,
    sources: &[Source],
    on_event: &mut dyn FnMut(HarvestEvent),
) -> Result<HarvestLog, ScrapeError> {
    if !config.output_dir.is_dir() {
        std::fs::create_dir_all(&config.output_dir)?;
        log::info!("Created base directory: {}", config.output_dir.display());
    }

    let total = config.entities.len();
    on_event(HarvestEvent::Started { total });

    let mut harvest_log = HarvestLog::new();
    for (index, entity) in config.entities.iter().enumerate() {
        if index > 0 {
            fetcher.pause(config.entity_delay());
        }
        log::info!("========== Processing: {} ==========", entity.name);
        let report = harvest_entity(fetcher, config, entity, sources, index, on_event)?;
        log::info!(
            "========== Finished processing: {} ({} new images) ==========",
            entity.name,
            report.downloaded()
        );
        on_event(HarvestEvent::EntityFinished {
            index,
            report: report.clone(),
        });
        harvest_log.add(report);
    }

    on_event(HarvestEvent::Done);
    Ok(harvest_log)
}

#[cfg(test)]
#[path = "tests/harvest_tests.rs"]
mod tests;
