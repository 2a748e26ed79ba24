pub mod cell;
pub mod cli;
pub mod coerce;
pub mod columns;
pub mod config;
pub mod consolidate;
pub mod error;
pub mod filter;
pub mod header;
pub mod io_utils;
pub mod mapping;
pub mod record;
pub mod schema;
pub mod table;
pub mod union;
pub mod vocabulary;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use crate::{
    cell::RawTable,
    cli::{Cli, Commands, SourceArgs},
    config::ConsolidationConfig,
    consolidate::Consolidator,
    error::ConsolidateError,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheet_consolidate", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Consolidate(args) => handle_consolidate(&args),
        Commands::Columns(args) => columns::execute(&args),
        Commands::Config(args) => handle_config(&args),
    }
}

fn handle_consolidate(args: &cli::ConsolidateArgs) -> Result<()> {
    let config = load_config(&args.sources)?;
    let consolidator = Consolidator::new(&config)?;
    let (tables, unreadable) = read_sources(&args.sources)?;

    let table = match consolidator.consolidate(&tables) {
        Ok(table) => table,
        Err(ConsolidateError::NoData { skipped, .. }) => {
            return Err(ConsolidateError::NoData {
                sources: args.sources.inputs.len(),
                skipped: skipped + unreadable,
            }
            .into());
        }
        Err(err) => return Err(err.into()),
    };

    let delimiter =
        io_utils::resolve_output_delimiter(args.output.as_deref(), args.output_delimiter);
    let mut writer = io_utils::open_csv_writer(args.output.as_deref(), delimiter)?;
    let written = io_utils::write_consolidated(&mut writer, &table, &config.source_column)?;
    info!(
        "Wrote {written} record(s) across {} column(s); {} source(s) skipped",
        table.columns().len() + 1,
        table.skipped().len() + unreadable
    );
    Ok(())
}

fn handle_config(args: &cli::ConfigArgs) -> Result<()> {
    let config = ConsolidationConfig::default();
    match &args.output {
        Some(path) if !io_utils::is_dash(path) => {
            config.save(path)?;
            info!("Default configuration written to {path:?}");
        }
        _ => print!("{}", config.to_yaml_string()?),
    }
    Ok(())
}

/// Built-in or file configuration, with command-line overrides applied.
pub(crate) fn load_config(args: &SourceArgs) -> Result<ConsolidationConfig> {
    let mut config = match &args.config {
        Some(path) => ConsolidationConfig::load(path)
            .with_context(|| format!("Loading configuration from {path:?}"))?,
        None => ConsolidationConfig::default(),
    };
    if let Some(policy) = args.match_policy {
        config.match_policy = policy;
    }
    debug!(
        "Match policy '{}', serial dates {:?}, {} alias(es)",
        config.match_policy,
        config.serial_dates,
        config.aliases.len()
    );
    Ok(config)
}

/// Reads every input. A file that cannot be read or decoded is skipped with
/// a warning; the count of such files is returned alongside the tables.
pub(crate) fn read_sources(args: &SourceArgs) -> Result<(Vec<RawTable>, usize)> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let mut tables = Vec::with_capacity(args.inputs.len());
    let mut unreadable = 0usize;
    for path in &args.inputs {
        let delimiter = io_utils::resolve_input_delimiter(path, args.delimiter);
        match io_utils::read_raw_table(path, delimiter, encoding) {
            Ok(table) => {
                debug!(
                    "Read {} row(s) x {} column(s) from {path:?}",
                    table.row_count(),
                    table.column_count()
                );
                tables.push(table);
            }
            Err(err) => {
                warn!("Skipping unreadable source {path:?}: {err:#}");
                unreadable += 1;
            }
        }
    }
    Ok((tables, unreadable))
}
