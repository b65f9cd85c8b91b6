use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use dexgrab_core::Source;
use dexgrab_scraper::{HarvestConfig, HarvestEvent, HarvestLog, HttpClient, SourceReport};

use super::load_config;
use crate::cli_types::RunArgs;
use crate::error::CliError;
use crate::logging;

/// Apply command-line overrides to the loaded configuration and return the
/// sources to run.
pub(crate) fn apply_run_args(
    config: &mut HarvestConfig,
    args: &RunArgs,
) -> Result<Vec<Source>, CliError> {
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(limit) = args.limit {
        config.danbooru.max_images_per_entity = limit;
    }

    if let Some(names) = &args.entities {
        for name in names {
            if !config.entities.iter().any(|e| e.matches_name(name)) {
                let known: Vec<&str> = config.entities.iter().map(|e| e.name.as_str()).collect();
                return Err(CliError::unknown_entity(format!(
                    "'{}' (configured: {})",
                    name,
                    known.join(", ")
                )));
            }
        }
        config
            .entities
            .retain(|e| names.iter().any(|n| e.matches_name(n)));
    }

    let sources = match &args.sources {
        Some(list) => dexgrab_scraper::run_order(list),
        None => Source::all().to_vec(),
    };
    if sources.is_empty() {
        return Err(CliError::config("no sources selected"));
    }
    Ok(sources)
}

fn source_line(report: &SourceReport) {
    if let Some(reason) = &report.aborted {
        log::warn!(
            "  {} {}: stopped early ({}); {} downloaded",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            report.source,
            reason,
            report.downloaded,
        );
    } else {
        log::info!(
            "  {} {}: {} downloaded, {} skipped, {} failed ({} candidates)",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            report.source,
            report.downloaded,
            report.skipped,
            report.failed,
            report.candidates,
        );
    }
    if report.malformed > 0 {
        log::warn!(
            "    {} {} post records without an id or file URL",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            report.malformed,
        );
    }
}

fn print_summary(harvest_log: &HarvestLog) {
    let summary = harvest_log.summary();

    log::info!("");
    log::info!("{}", "Summary:".if_supports_color(Stdout, |t| t.bold()));
    for entity in harvest_log.entities() {
        log::info!(
            "  {:<16} {:>5} new images  {}",
            entity.entity,
            entity.downloaded(),
            entity
                .directory
                .display()
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log::info!("");
    log::info!(
        "{} {} new images across {} entities ({} skipped)",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        summary.downloaded,
        summary.entities,
        summary.skipped,
    );
    if summary.failed > 0 {
        log::warn!(
            "{} {} downloads failed",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            summary.failed,
        );
    }
    if summary.aborted_sources > 0 {
        log::warn!(
            "{} {} source passes stopped early",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            summary.aborted_sources,
        );
    }
    log::info!("");
    log::info!(
        "{}",
        "Review the downloaded images manually and remove irrelevant or low-quality ones."
            .if_supports_color(Stdout, |t| t.dimmed()),
    );
}

/// Run the harvest with the loaded configuration plus `args`.
pub(crate) fn run_harvest(
    config_path: Option<&Path>,
    args: &RunArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let mut config = load_config(config_path)?;
    let sources = apply_run_args(&mut config, args)?;

    let source_names: Vec<&str> = sources.iter().map(|s| s.display_name()).collect();
    log::info!(
        "Harvesting {} entities from {}",
        config.entities.len(),
        source_names.join(", ").if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!(
        "Output: {}",
        config.output_dir.display().if_supports_color(Stdout, |t| t.dimmed()),
    );
    log::info!("");

    let client = HttpClient::new(
        &config.http.user_agent,
        config.http.timeout(),
        config.http.download_timeout(),
    )?;

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(config.entities.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("  {bar:30.cyan/blue} {pos}/{len} {msg}") {
            pb.set_style(style);
        }
        pb
    };

    let mut on_event = |event: HarvestEvent| match event {
        HarvestEvent::Started { total } => pb.set_length(total as u64),
        HarvestEvent::EntityStarted { entity, .. } => pb.set_message(entity),
        HarvestEvent::SourceFinished { entity, report, .. } => {
            // In quiet mode, name the entity before its warnings.
            if report.aborted.is_some() && log::max_level() < LevelFilter::Info {
                log::warn!("{}:", entity);
            }
            source_line(&report);
        }
        HarvestEvent::EntityFinished { .. } => pb.inc(1),
        HarvestEvent::Done => pb.finish_and_clear(),
    };

    logging::set_progress_bar(Some(pb.clone()));
    let result = dexgrab_scraper::harvest_all(&client, &config, &sources, &mut on_event);
    logging::set_progress_bar(None);
    let harvest_log = result?;
    print_summary(&harvest_log);
    Ok(())
}
