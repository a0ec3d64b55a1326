//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! Pipeline stages run inside `info_span!`s and report counts and
//! `duration_ms` when they finish.
//!
//! # Log Levels
//!
//! - `error`: fatal errors
//! - `warn`: unmatched labels, duplicate columns, unparsable values
//! - `info`: stage progress and counts
//! - `debug`: per-rule and per-sheet detail
//! - `trace`: per-sample detail; free text only with `--log-data`

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder used when free-text logging is disabled.
pub const REDACTED_VALUE: &str = "[REDACTED]";

/// Crates whose events follow the configured level; others stay at warn.
const WORKSPACE_CRATES: [&str; 5] = [
    "babybiome_cli",
    "babybiome_db",
    "babybiome_ingest",
    "babybiome_model",
    "babybiome_transform",
];

pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Relaxed)
}

/// Returns the input value when free-text logging is enabled, otherwise a
/// redacted token.
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` override `level_filter`. Off when the level was given
    /// explicitly on the command line.
    pub use_env_filter: bool,
    pub with_timestamps: bool,
    pub with_target: bool,
    pub with_spans: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// When set, logs are appended to this file instead of stderr.
    pub log_file: Option<PathBuf>,
    /// Whether questionnaire free text may be logged.
    pub log_data: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_timestamps: false,
            with_target: false,
            with_spans: true,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
            log_data: false,
        }
    }
}

/// Initialize the global tracing subscriber. Call once at startup.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    if let Some(path) = &config.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        init_logging_with_writer(config, SharedFileWriter::new(file));
    } else {
        init_logging_with_writer(config, io::stderr);
    }
    Ok(())
}

/// Initialize logging with a custom writer.
pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    LOG_DATA_ENABLED.store(config.log_data, Ordering::Release);
    let filter = build_env_filter(config.level_filter, config.use_env_filter);

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(config.with_target)
                .with_span_events(if config.with_spans {
                    fmt::format::FmtSpan::CLOSE
                } else {
                    fmt::format::FmtSpan::NONE
                });

            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_writer(writer)
                .with_ansi(config.with_ansi)
                .with_target(config.with_target);

            if config.with_timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .init();
            }
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(config.with_ansi)
                .with_target(config.with_target);

            if config.with_timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .init();
            }
        }
    }
}

#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl SharedFileWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

struct SharedFileGuard {
    file: Arc<Mutex<std::fs::File>>,
}

impl Write for SharedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard {
            file: Arc::clone(&self.file),
        }
    }
}

/// Filter directives for `level`: workspace crates at `level`, everything
/// else at warn or quieter.
pub fn filter_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    let external = if level == "off" || level == "error" {
        level.as_str()
    } else {
        "warn"
    };
    let mut directives = vec![external.to_string()];
    directives.extend(
        WORKSPACE_CRATES
            .iter()
            .map(|krate| format!("{krate}={level}")),
    );
    directives.join(",")
}

fn build_env_filter(level: LevelFilter, use_env: bool) -> EnvFilter {
    let fallback = || EnvFilter::new(filter_directives(level));
    if use_env {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback())
    } else {
        fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_scope_level_to_workspace() {
        assert_eq!(
            filter_directives(LevelFilter::DEBUG),
            "warn,babybiome_cli=debug,babybiome_db=debug,babybiome_ingest=debug,\
             babybiome_model=debug,babybiome_transform=debug"
        );
        assert!(filter_directives(LevelFilter::ERROR).starts_with("error,"));
    }

    #[test]
    fn values_are_redacted_by_default() {
        assert_eq!(redact_value("Probe aufgetaut"), REDACTED_VALUE);
    }
}
