//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use patmine_cli::config::ConfigOverrides;

#[derive(Parser)]
#[command(
    name = "patmine",
    version,
    about = "Mine and rank business patterns in CRM, ERP and financial records",
    long_about = "Mine association rules, temporal patterns and domain signals from \
                  business record files (CSV or JSON) and rank them by a weighted \
                  multi-factor score."
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze one or more source files and print the ranked patterns.
    Analyze(AnalyzeArgs),

    /// Print the inferred type of every column in a source file.
    Columns(ColumnsArgs),

    /// List the domain detectors and the fields each one needs.
    Detectors,
}

#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Source files (.csv or .json). The file stem names a CSV source.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// TOML analysis configuration. Flags below override its values.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum number of ranked patterns.
    #[arg(long = "max-patterns", value_name = "N")]
    pub max_patterns: Option<usize>,

    /// Minimum scored confidence, 0-1.
    #[arg(long = "min-confidence", value_name = "X")]
    pub min_confidence: Option<f64>,

    /// Minimum support, 0-1.
    #[arg(long = "min-support", value_name = "X")]
    pub min_support: Option<f64>,

    /// Largest itemset mined for association rules.
    #[arg(long = "max-itemset-size", value_name = "N")]
    pub max_itemset_size: Option<usize>,

    /// Also write the ranked patterns as an export document to PATH.
    #[arg(long = "export", value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Print the export document to stdout instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

impl AnalyzeArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            max_patterns: self.max_patterns,
            min_confidence: self.min_confidence,
            min_support: self.min_support,
            max_itemset_size: self.max_itemset_size,
        }
    }
}

#[derive(Parser)]
pub struct ColumnsArgs {
    /// Source file (.csv or .json).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
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
