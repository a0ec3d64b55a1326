//! CLI argument definitions for the babybiome ETL.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "babybiome",
    version,
    about = "Family questionnaire ETL - reshape, enrich and load babybiome sheets",
    long_about = "Convert the babybiome family questionnaires into tidy tables.\n\n\
                  Timepoint sheets (B###) are reshaped, enriched with derived features,\n\
                  written to CSV and optionally loaded into a DuckDB database.\n\
                  The general sheet is reshaped and written to CSV."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
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

    /// Allow questionnaire free text in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Process the timepoint worksheets (B###) of a workbook.
    BabySheets(BabySheetsArgs),

    /// Process the general worksheet of a workbook.
    GeneralSheet(GeneralSheetArgs),

    /// List the database tables and their columns.
    Tables,
}

/// Rename and deletion workbooks shared by both sheet kinds.
#[derive(Args)]
pub struct MappingArgs {
    /// Workbook with `Old` and `New` columns renaming sheet labels.
    #[arg(long = "renames", value_name = "XLSX")]
    pub renames: PathBuf,

    /// Workbook with an `Old` column listing labels to drop.
    #[arg(long = "deletions", value_name = "XLSX")]
    pub deletions: PathBuf,
}

#[derive(Args)]
pub struct BabySheetsArgs {
    /// Workbook holding the B### worksheets.
    #[arg(value_name = "WORKBOOK")]
    pub workbook: PathBuf,

    #[command(flatten)]
    pub mapping: MappingArgs,

    /// First family number to read.
    #[arg(long = "first", default_value_t = 1)]
    pub first: u32,

    /// Last family number to read (inclusive).
    #[arg(long = "last")]
    pub last: u32,

    /// Family numbers without a worksheet.
    #[arg(long = "skip", value_delimiter = ',', value_name = "N,..")]
    pub skip: Vec<u32>,

    /// TOML file replacing the built-in duplicate exclusions.
    #[arg(long = "exclusions", value_name = "TOML")]
    pub exclusions: Option<PathBuf>,

    /// Directory for the dated CSV file.
    #[arg(long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Skip writing the CSV file.
    #[arg(long = "no-csv")]
    pub no_csv: bool,

    /// DuckDB database to (re)load with the member samples.
    #[arg(long = "database", value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Write a JSON run report to this path.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,
}

#[derive(Args)]
pub struct GeneralSheetArgs {
    /// Workbook holding the general worksheet.
    #[arg(value_name = "WORKBOOK")]
    pub workbook: PathBuf,

    #[command(flatten)]
    pub mapping: MappingArgs,

    /// Worksheet name, if it differs from the standard one.
    #[arg(long = "sheet", value_name = "NAME")]
    pub sheet: Option<String>,

    /// Directory for the dated CSV file.
    #[arg(long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Write a JSON run report to this path.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,
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

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
