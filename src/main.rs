//! Command-line driver: load config and data, run or resume an optimization,
//! and emit the JSON report.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tradevolve::config::ConfigManager;
use tradevolve::data::{CsvDataProvider, HistoricalDataProvider};
use tradevolve::engines::evaluation::BacktestEvaluator;
use tradevolve::engines::optimization::{
    ConsoleProgressCallback, OptimizationEngine, ResultReporter, RunState,
};

#[derive(Parser)]
#[command(author, version, about = "Evolutionary parameter search for trading strategies", long_about = None)]
struct Cli {
    /// TOML or JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Symbol to optimize (overrides data.symbol)
    #[arg(short, long)]
    symbol: Option<String>,

    /// Directory holding <SYMBOL>.csv files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Start of the evaluation window (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    start: Option<String>,

    /// End of the evaluation window (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    end: Option<String>,

    /// Random seed (overrides optimizer.random_seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Continue from a saved run state
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Save the run state here after every iteration
    #[arg(long)]
    checkpoint: Option<PathBuf>,
}

fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD or RFC 3339", value))?;
    match date.and_hms_opt(0, 0, 0) {
        Some(naive) => Ok(naive.and_utc()),
        None => bail!("Invalid date '{}'", value),
    }
}

fn write_checkpoint(path: &Path, state: &RunState) -> Result<()> {
    let json = state.to_json()?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write checkpoint {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let manager = ConfigManager::new();
    if let Some(path) = &cli.config {
        manager
            .load_from_file(path)
            .with_context(|| format!("Loading {}", path.display()))?;
    }

    let start = cli.start.as_deref().map(parse_date).transpose()?;
    let end = cli.end.as_deref().map(parse_date).transpose()?;
    manager
        .update(|config| {
            if let Some(symbol) = &cli.symbol {
                config.data.symbol = symbol.clone();
            }
            if let Some(dir) = &cli.data_dir {
                config.data.data_dir = dir.clone();
            }
            if start.is_some() {
                config.data.start = start;
            }
            if end.is_some() {
                config.data.end = end;
            }
            if cli.seed.is_some() {
                config.optimizer.random_seed = cli.seed;
            }
        })
        .context("Invalid configuration")?;
    let config = manager.get();

    let provider =
        CsvDataProvider::new(&config.data.data_dir).with_min_rows(config.data.min_rows);
    let (from, to) = config.data.range();
    let series = provider
        .get_series(&config.data.symbol, from, to)
        .with_context(|| format!("Loading price history for {}", config.data.symbol))?;
    if !series.gaps().is_empty() {
        log::warn!("{} has {} gaps in its timeline", series.symbol(), series.gaps().len());
    }

    let evaluator = BacktestEvaluator::new(
        config.strategy.kind.build(),
        config.backtesting.portfolio_settings(),
        config.backtesting.fitness_metric,
        config.strategy.timeframes.clone(),
    )?;
    let engine = OptimizationEngine::new(config.optimizer.clone(), Arc::new(evaluator))?;

    let mut state = match &cli.resume {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Reading run state {}", path.display()))?;
            let state = RunState::from_json(&json)?;
            engine.ensure_compatible(&state)?;
            log::info!(
                "Resuming run (seed {}) at iteration {}",
                state.seed(),
                state.iteration()
            );
            state
        }
        None => engine.initialize(),
    };

    let mut callback = ConsoleProgressCallback;
    while !state.is_terminated() {
        let before = state.iteration();
        engine.step(&mut state, &series, &mut callback)?;
        if let Some(path) = &cli.checkpoint {
            if state.iteration() != before || state.is_terminated() {
                write_checkpoint(path, &state)?;
            }
        }
    }

    let report = ResultReporter::report(&state)?;
    let json = report.to_json_pretty()?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Writing report {}", path.display()))?;
            log::info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
