//! CLI argument definitions for peakmerge.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use peak_cli::logging::{LogConfig, LogFormat};
use tracing::level_filters::LevelFilter;

use peak_fetch::{GEONORGE_API_URL, N50_DOWNLOAD_URL, OVERPASS_API_URL};

#[derive(Parser)]
#[command(
    name = "peakmerge",
    version,
    about = "Merge SSR peak names and N50 terrain points into OpenStreetMap peaks",
    long_about = "Merge SSR peak names and N50 terrain points into the OpenStreetMap \
                  peaks of one Norwegian municipality.\n\n\
                  The result is an OSM file for review in JOSM. Nodes that need a \
                  human look carry CHECK, DUPLICATE or CLOSE tags."
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

impl Cli {
    /// Logging setup for this invocation.
    ///
    /// `--log-level` wins over `-v`/`-q`; with neither, `RUST_LOG` applies.
    /// Colors follow `--color`, and in auto mode only a terminal stderr
    /// gets them.
    pub fn log_config(&self) -> LogConfig {
        let explicit = self.log_level.map(LevelFilter::from);
        let ansi = match self.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.log_file.is_none() && io::stderr().is_terminal(),
        };
        LogConfig::default()
            .with_level(explicit.unwrap_or_else(|| self.verbosity.tracing_level_filter()))
            .with_env_filter(explicit.is_none() && !self.verbosity.is_present())
            .with_format(self.log_format.into())
            .with_log_file(self.log_file.clone())
            .with_ansi(ansi)
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge the peaks of one municipality.
    Merge(MergeArgs),

    /// Resolve a municipality and print the file names used for it.
    Lookup(LookupArgs),
}

#[derive(Parser)]
pub struct MergeArgs {
    /// Municipality number or name.
    #[arg(value_name = "MUNICIPALITY")]
    pub municipality: String,

    /// Municipality name; skips the GeoNorge lookup when MUNICIPALITY is a number.
    #[arg(long = "municipality-name", value_name = "NAME")]
    pub municipality_name: Option<String>,

    /// Folder holding the default SSR input file.
    #[arg(long = "input-dir", value_name = "DIR", default_value = ".")]
    pub input_dir: PathBuf,

    /// SSR place name GeoJSON (default: <INPUT_DIR>/stedsnavn_<id>_<name>.geojson).
    #[arg(long = "ssr", value_name = "FILE")]
    pub ssr: Option<PathBuf>,

    /// N50 terrain points already converted to OSM, instead of the Kartverket
    /// download.
    #[arg(long = "n50", value_name = "FILE")]
    pub n50: Option<PathBuf>,

    /// Kartverket N50 GML archive saved earlier, instead of downloading it.
    #[arg(long = "n50-zip", value_name = "FILE", conflicts_with = "n50")]
    pub n50_zip: Option<PathBuf>,

    /// Existing OSM peaks from a file instead of Overpass.
    #[arg(long = "osm", value_name = "FILE")]
    pub osm: Option<PathBuf>,

    /// Merged output file (default: peaks_<id>_<name>.osm).
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Matching radii and thresholds as TOML.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write the records that need review as CSV.
    #[arg(long = "review-csv", value_name = "FILE")]
    pub review_csv: Option<PathBuf>,

    #[command(flatten)]
    pub endpoints: EndpointArgs,
}

#[derive(Parser)]
pub struct LookupArgs {
    /// Municipality number or name.
    #[arg(value_name = "MUNICIPALITY")]
    pub municipality: String,

    #[command(flatten)]
    pub endpoints: EndpointArgs,
}

#[derive(Parser)]
pub struct EndpointArgs {
    /// GeoNorge municipality register.
    #[arg(long = "geonorge-url", value_name = "URL", default_value = GEONORGE_API_URL)]
    pub geonorge_url: String,

    /// Folder of the Kartverket N50 GML archives.
    #[arg(long = "n50-url", value_name = "URL", default_value = N50_DOWNLOAD_URL)]
    pub n50_url: String,

    /// Overpass interpreter.
    #[arg(long = "overpass-url", value_name = "URL", default_value = OVERPASS_API_URL)]
    pub overpass_url: String,
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
            LogLevelArg::Error => Self::ERROR,
            LogLevelArg::Warn => Self::WARN,
            LogLevelArg::Info => Self::INFO,
            LogLevelArg::Debug => Self::DEBUG,
            LogLevelArg::Trace => Self::TRACE,
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
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}
