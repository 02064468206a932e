//! Logging setup on top of `tracing-subscriber`.
//!
//! Units log through `tracing`: one `unit` span per load unit, with table
//! writes reported as `info` events carrying `table`, `rows`, `partitions`
//! and `duration_ms`. Levels:
//!
//! - `error`: a unit aborted
//! - `warn`: integrity-check findings, skipped steps
//! - `info`: unit progress and per-table write counts
//! - `debug`: shard loads, dedup counts, id assignment

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Crates whose events follow the configured level. Everything else stays at
/// `warn` unless `RUST_LOG` says otherwise.
const WORKSPACE_CRATES: [&str; 6] = [
    "warehouse_cli",
    "warehouse_ingest",
    "warehouse_model",
    "warehouse_output",
    "warehouse_transform",
    "warehouse_xpt",
];

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` replace `level_filter` when it is set.
    pub use_env_filter: bool,
    pub with_timestamps: bool,
    pub with_target: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Append to this file instead of writing to stderr.
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    /// One JSON object per event.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_timestamps: false,
            with_target: false,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
        }
    }
}

/// Install the global subscriber. Call once, before any unit runs.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            fmt_layer(config, Mutex::new(file))
        }
        None => fmt_layer(config, io::stderr),
    };
    tracing_subscriber::registry()
        .with(layer)
        .with(build_env_filter(config))
        .init();
    Ok(())
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

fn fmt_layer<W>(config: &LogConfig, writer: W) -> BoxedLayer
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(config.with_target);
    match (config.format, config.with_timestamps) {
        (LogFormat::Json, _) => layer.json().with_span_list(true).boxed(),
        (LogFormat::Compact, true) => layer.compact().with_ansi(config.with_ansi).boxed(),
        (LogFormat::Compact, false) => layer
            .compact()
            .with_ansi(config.with_ansi)
            .without_time()
            .boxed(),
        (LogFormat::Pretty, true) => layer.with_ansi(config.with_ansi).boxed(),
        (LogFormat::Pretty, false) => layer.with_ansi(config.with_ansi).without_time().boxed(),
    }
}

fn build_env_filter(config: &LogConfig) -> EnvFilter {
    if config.use_env_filter
        && let Ok(filter) = EnvFilter::try_from_default_env()
    {
        return filter;
    }
    EnvFilter::new(default_directives(config.level_filter))
}

fn default_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    let mut directives = String::from("warn");
    for krate in WORKSPACE_CRATES {
        directives.push(',');
        directives.push_str(krate);
        directives.push('=');
        directives.push_str(&level);
    }
    directives
}
