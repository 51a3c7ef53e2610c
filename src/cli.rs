//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::local_data_adapter::LocalDataAdapter;
use crate::domain::cache::CacheConfig;
use crate::domain::error::LiquidityError;
use crate::domain::liquidity::LiquidityIndexEngine;
use crate::domain::metadata::instrument_catalog;
use crate::domain::price_ratio::PriceRatio;
use crate::domain::series::TimeSeriesTable;
use crate::domain::ticker::Ticker;
use crate::domain::yield_spread::YieldSpread;

#[derive(Parser, Debug)]
#[command(name = "liquidity", about = "Derived market-series analytics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print an instrument's yield series
    Yields {
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        tail: usize,
    },
    /// Yield spread between an instrument and a benchmark
    Spread {
        symbol: String,
        #[arg(default_value = "UST_10Y")]
        benchmark: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        tail: usize,
    },
    /// Price ratio between two instruments
    Ratio {
        symbol: String,
        benchmark: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        tail: usize,
    },
    /// Composite macro liquidity index
    Index {
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        tail: usize,
    },
    /// List known instruments
    Catalog,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Yields {
            symbol,
            config,
            output,
            tail,
        } => run_yields(&symbol, config.as_ref(), output.as_ref(), tail),
        Command::Spread {
            symbol,
            benchmark,
            config,
            output,
            tail,
        } => run_spread(&symbol, &benchmark, config.as_ref(), output.as_ref(), tail),
        Command::Ratio {
            symbol,
            benchmark,
            config,
            output,
            tail,
        } => run_ratio(&symbol, &benchmark, config.as_ref(), output.as_ref(), tail),
        Command::Index {
            start,
            end,
            config,
            output,
            tail,
        } => run_index(start, end, config.as_ref(), output.as_ref(), tail),
        Command::Catalog => run_catalog(),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn load_settings(
    config: Option<&PathBuf>,
) -> Result<(CacheConfig, LocalDataAdapter), LiquidityError> {
    let adapter = match config {
        Some(path) => {
            FileConfigAdapter::from_file(path).map_err(|e| LiquidityError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?
        }
        None => FileConfigAdapter::empty(),
    };
    Ok((
        adapter.cache_config(),
        LocalDataAdapter::new(adapter.data_dir()),
    ))
}

fn emit(
    table: &TimeSeriesTable,
    output: Option<&PathBuf>,
    tail: usize,
) -> Result<(), LiquidityError> {
    match output {
        Some(path) => {
            table.write_csv_path(path)?;
            eprintln!("wrote {} rows to {}", table.len(), path.display());
        }
        None => print!("{}", table.tail(tail)),
    }
    Ok(())
}

fn run_yields(
    symbol: &str,
    config: Option<&PathBuf>,
    output: Option<&PathBuf>,
    tail: usize,
) -> Result<(), LiquidityError> {
    let (cache_config, provider) = load_settings(config)?;
    let mut ticker = Ticker::new(symbol, &provider, &cache_config)?;
    emit(&ticker.yields()?, output, tail)
}

fn run_spread(
    symbol: &str,
    benchmark: &str,
    config: Option<&PathBuf>,
    output: Option<&PathBuf>,
    tail: usize,
) -> Result<(), LiquidityError> {
    let (cache_config, provider) = load_settings(config)?;
    let mut engine = YieldSpread::new(symbol, benchmark, &provider, &cache_config)?;
    emit(&engine.spread()?, output, tail)
}

fn run_ratio(
    symbol: &str,
    benchmark: &str,
    config: Option<&PathBuf>,
    output: Option<&PathBuf>,
    tail: usize,
) -> Result<(), LiquidityError> {
    let (cache_config, provider) = load_settings(config)?;
    let mut engine = PriceRatio::new(symbol, benchmark, &provider, &cache_config)?;
    emit(&engine.ratio()?, output, tail)
}

fn run_index(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    config: Option<&PathBuf>,
    output: Option<&PathBuf>,
    tail: usize,
) -> Result<(), LiquidityError> {
    let (cache_config, provider) = load_settings(config)?;
    let mut engine = LiquidityIndexEngine::new(&provider, &cache_config)?;
    emit(&engine.compute(start, end)?, output, tail)
}

fn run_catalog() -> Result<(), LiquidityError> {
    for asset in instrument_catalog() {
        println!("{:<8} {:<10} {}", asset.symbol, asset.class.to_string(), asset.name);
    }
    Ok(())
}
