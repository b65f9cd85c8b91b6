//! Logger setup.
//!
//! Log lines are the CLI's normal output, so they share stdout with the
//! harvest progress bar. Every record is written inside
//! [`ProgressBar::suspend`] while a bar is registered, which clears the bar,
//! prints the line and redraws the bar underneath.

use std::io::Write;
use std::sync::Mutex;

use indicatif::ProgressBar;
use log::{LevelFilter, Log, Metadata, Record};

static ACTIVE_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

/// Register (or with `None`, release) the bar that log output must not tear.
pub(crate) fn set_progress_bar(bar: Option<ProgressBar>) {
    if let Ok(mut active) = ACTIVE_BAR.lock() {
        *active = bar;
    }
}

fn active_bar() -> Option<ProgressBar> {
    ACTIVE_BAR.lock().ok().and_then(|active| active.clone())
}

struct BarLogger {
    inner: env_logger::Logger,
}

impl Log for BarLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.inner.matches(record) {
            return;
        }
        match active_bar() {
            Some(bar) => bar.suspend(|| self.inner.log(record)),
            None => self.inner.log(record),
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Output is the bare message at `info`. `--verbose` adds level and target.
/// `RUST_LOG` still wins over both flags.
fn builder(verbose: bool, quiet: bool) -> env_logger::Builder {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .target(env_logger::Target::Stdout)
        .parse_default_env();
    if verbose {
        builder.format(|buf, record| {
            writeln!(buf, "[{:<5} {}] {}", record.level(), record.target(), record.args())
        });
    } else {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }
    builder
}

/// Install the logger.
pub(crate) fn init_logger(verbose: bool, quiet: bool) {
    let inner = builder(verbose, quiet).build();
    let max_level = inner.filter();
    if log::set_boxed_logger(Box::new(BarLogger { inner })).is_ok() {
        log::set_max_level(max_level);
    }
}
