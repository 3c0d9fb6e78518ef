use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Exploratory report over an osu! beatmap metadata dump",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load maps.json, drop duplicate rows, type the columns and write the CSV cache
    Load(LoadArgs),
    /// Run the full pipeline and write figures plus index.html to an output directory
    Report(ReportArgs),
    /// Print the most frequent values of one column
    Frequency(FrequencyArgs),
    /// Print summary statistics for numeric columns
    Stats(StatsArgs),
    /// Write the default report configuration as YAML
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// JSON dump of beatmap records
    #[arg(short = 'i', long = "input", default_value = "maps.json")]
    pub input: PathBuf,
    /// Destination CSV cache (`-` for stdout)
    #[arg(short = 'o', long = "output", default_value = "beatmaps.csv")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// JSON dump of beatmap records
    #[arg(short = 'i', long = "input", default_value = "maps.json")]
    pub input: PathBuf,
    /// CSV cache written after loading
    #[arg(long = "cache", default_value = "beatmaps.csv")]
    pub cache: PathBuf,
    /// Skip writing the CSV cache
    #[arg(long = "no-cache", conflicts_with = "reuse_cache")]
    pub no_cache: bool,
    /// Read the CSV cache instead of the JSON dump when it exists
    #[arg(long = "reuse-cache")]
    pub reuse_cache: bool,
    /// Directory receiving the figures and index.html
    #[arg(short = 'o', long = "output", default_value = "report")]
    pub output: PathBuf,
    /// YAML file overriding the default report configuration
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct FrequencyArgs {
    /// JSON dump or CSV cache
    #[arg(short = 'i', long = "input", default_value = "maps.json")]
    pub input: PathBuf,
    /// Column to count
    #[arg(short = 'C', long = "column")]
    pub column: String,
    /// Number of values to show
    #[arg(long, default_value_t = 20)]
    pub top: usize,
    /// Restrict to one game mode code (0 standard, 1 taiko, 2 ctb, 3 mania)
    #[arg(long)]
    pub mode: Option<i64>,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// JSON dump or CSV cache
    #[arg(short = 'i', long = "input", default_value = "maps.json")]
    pub input: PathBuf,
    /// Columns to include (defaults to every numeric column)
    #[arg(short = 'C', long = "columns", value_delimiter = ',')]
    pub columns: Vec<String>,
    /// Restrict to one game mode code
    #[arg(long)]
    pub mode: Option<i64>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Destination YAML file
    #[arg(short = 'o', long = "output", default_value = "report.yml")]
    pub output: PathBuf,
}
