pub mod beatmap;
pub mod cli;
pub mod config;
pub mod data;
pub mod enrich;
pub mod error;
pub mod frequency;
pub mod io_utils;
pub mod loader;
pub mod report;
pub mod schema;
pub mod stats;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands},
    config::ReportConfig,
    enrich::Enricher,
    loader::LoadedTable,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("osu_map_report", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Load(args) => handle_load(&args),
        Commands::Report(args) => handle_report(&args),
        Commands::Frequency(args) => frequency::execute(&args),
        Commands::Stats(args) => stats::execute(&args),
        Commands::Config(args) => handle_config(&args),
    }
}

fn handle_load(args: &cli::LoadArgs) -> Result<()> {
    info!("Loading beatmaps from {:?}", args.input);
    let table = loader::load_table(&args.input)
        .with_context(|| format!("Loading beatmaps from {:?}", args.input))?;
    loader::write_csv(&table, &args.output)
        .with_context(|| format!("Writing beatmap cache to {:?}", args.output))?;
    info!(
        "Cached {} row(s) ({} duplicate(s) dropped, {} coercion warning(s)) to {:?}",
        table.len(),
        table.duplicates_removed,
        table.warnings.len(),
        args.output
    );
    Ok(())
}

fn handle_report(args: &cli::ReportArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => ReportConfig::load(path)
            .with_context(|| format!("Loading report configuration from {path:?}"))?,
        None => ReportConfig::default(),
    };
    let table = load_for_report(args)?;
    debug!("Loaded columns: {}", table.schema.headers().join(", "));

    let enricher = Enricher::new(config.taxonomy.clone())
        .context("Validating the difficulty taxonomy")?;
    let rows = enricher.enrich(table.beatmaps());
    info!("Enriched {} beatmap(s)", rows.len());

    let outcome = report::generate(&rows, &config);
    report::write_report(&outcome, &args.output)
        .with_context(|| format!("Writing report to {:?}", args.output))?;
    Ok(())
}

/// Reads the cache when asked to and it exists; otherwise loads the dump and
/// refreshes the cache unless caching is disabled.
fn load_for_report(args: &cli::ReportArgs) -> Result<LoadedTable> {
    if args.reuse_cache && args.cache.exists() {
        info!("Reusing beatmap cache {:?}", args.cache);
        return loader::read_csv(&args.cache)
            .with_context(|| format!("Reading beatmap cache {:?}", args.cache));
    }
    let table = loader::load_table(&args.input)
        .with_context(|| format!("Loading beatmaps from {:?}", args.input))?;
    if !args.no_cache {
        loader::write_csv(&table, &args.cache)
            .with_context(|| format!("Writing beatmap cache to {:?}", args.cache))?;
        info!("Cached {} row(s) to {:?}", table.len(), args.cache);
    }
    Ok(table)
}

fn handle_config(args: &cli::ConfigArgs) -> Result<()> {
    let yaml = ReportConfig::default()
        .to_yaml_string()
        .context("Serializing the default report configuration")?;
    io_utils::write_text_file(&args.output, &yaml)?;
    info!("Default report configuration written to {:?}", args.output);
    Ok(())
}
