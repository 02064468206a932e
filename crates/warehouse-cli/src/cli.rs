//! CLI argument definitions for `warehouse-etl`.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;
use warehouse_cli::logging::{LogConfig, LogFormat};
use warehouse_model::{KeyStrategy, Unit};

#[derive(Parser)]
#[command(
    name = "warehouse-etl",
    version,
    about = "Load I94 travel records into a Parquet warehouse",
    long_about = "Load I94 travel records into a Parquet warehouse.\n\n\
                  Reads the SAS Transport record shards, the city demographics file and\n\
                  the label-description file, and writes one fact table plus its\n\
                  dimension and lookup tables as Parquet directories."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machines).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Logging settings from the global flags. An explicit `--log-level` or
    /// `-v`/`-q` wins over `RUST_LOG`.
    pub fn log_config(&self) -> LogConfig {
        let ansi = match self.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.log_file.is_none() && io::stderr().is_terminal(),
        };
        LogConfig {
            level_filter: self
                .log_level
                .map_or_else(|| self.verbosity.tracing_level_filter(), LevelFilter::from),
            use_env_filter: !self.verbosity.is_present() && self.log_level.is_none(),
            with_ansi: ansi,
            format: self.log_format.into(),
            log_file: self.log_file.clone(),
            ..LogConfig::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the load units and write the warehouse.
    Run(RunArgs),

    /// List the tables a run writes.
    Tables(TablesArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Source root holding the raw inputs.
    #[arg(long = "source", value_name = "DIR")]
    pub source: Option<String>,

    /// Destination root; each table gets its own directory.
    #[arg(long = "destination", value_name = "DIR")]
    pub destination: Option<String>,

    /// JSON config file (source, destination, credentials, key_strategy,
    /// reference_layout). Flags override its values.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run only these units (repeatable).
    #[arg(long = "only", value_enum, value_name = "UNIT")]
    pub only: Vec<UnitArg>,

    /// How surrogate ids are generated.
    #[arg(long = "key-strategy", value_enum)]
    pub key_strategy: Option<KeyStrategyArg>,

    /// Replace the built-in reference line windows with a JSON layout.
    #[arg(long = "reference-layout", value_name = "FILE")]
    pub reference_layout: Option<PathBuf>,

    /// Build every table but write nothing.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Count fact codes missing from the lookup tables after the run.
    #[arg(long = "check-integrity")]
    pub check_integrity: bool,
}

#[derive(Parser)]
pub struct TablesArgs {
    /// Reference layout to list lookup tables from.
    #[arg(long = "reference-layout", value_name = "FILE")]
    pub reference_layout: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum UnitArg {
    Immigration,
    Demographics,
    Reference,
}

impl From<UnitArg> for Unit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Immigration => Unit::Immigration,
            UnitArg::Demographics => Unit::Demographics,
            UnitArg::Reference => Unit::Reference,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KeyStrategyArg {
    Monotonic,
    ContentHash,
}

impl From<KeyStrategyArg> for KeyStrategy {
    fn from(arg: KeyStrategyArg) -> Self {
        match arg {
            KeyStrategyArg::Monotonic => KeyStrategy::Monotonic,
            KeyStrategyArg::ContentHash => KeyStrategy::ContentHash,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
