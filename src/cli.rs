//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_data_adapter::CsvDataAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::log_adapters::ConsoleLog;
use crate::domain::config::RunConfig;
use crate::domain::engine::{BacktestEngine, BacktestResult};
use crate::domain::error::FxSeasonError;
use crate::domain::metrics::Metrics;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::log_port::LogPort;

#[derive(Parser, Debug)]
#[command(name = "fxseason", about = "Currency-pair seasonality/GDP-momentum backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Equity curve CSV output path (default: equity.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a run configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest { config, output } => run_backtest(&config, output.as_ref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = FxSeasonError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn build_run_config(adapter: &FileConfigAdapter) -> Result<RunConfig, ExitCode> {
    RunConfig::from_config(adapter).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn resolve_data_dir(adapter: &FileConfigAdapter) -> Result<PathBuf, ExitCode> {
    match adapter.get_string("backtest", "data_dir") {
        Some(dir) if !dir.trim().is_empty() => Ok(PathBuf::from(dir.trim())),
        _ => {
            let err = FxSeasonError::ConfigMissing {
                section: "backtest".into(),
                key: "data_dir".into(),
            };
            eprintln!("error: {err}");
            Err(ExitCode::from(&err))
        }
    }
}

fn run_backtest(config_path: &PathBuf, output_path: Option<&PathBuf>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let run_config = match build_run_config(&adapter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let data_dir = match resolve_data_dir(&adapter) {
        Ok(d) => d,
        Err(code) => return code,
    };

    eprintln!(
        "Running backtest: {} ({} vs {}), {} to {}",
        run_config.ticker,
        run_config.country_a,
        run_config.country_b,
        run_config.start_date,
        run_config.end_date,
    );

    let data_port = CsvDataAdapter::new(data_dir);
    let logger = ConsoleLog;
    let output = output_path
        .cloned()
        .unwrap_or_else(|| PathBuf::from("equity.csv"));
    run_backtest_pipeline(&data_port, &logger, &run_config, Some(&output))
}

/// Runs the engine against an already-built config and data port, prints
/// the summary, and writes the equity curves when an output path is given.
/// Split out from [`run_backtest`] so hosts and tests can drive it with
/// their own ports.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    logger: &dyn LogPort,
    run_config: &RunConfig,
    output: Option<&PathBuf>,
) -> ExitCode {
    let engine = BacktestEngine::new(data_port, logger);

    let result = match engine.run(run_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_summary(&result, run_config);

    if let Some(output) = output {
        match write_equity_csv(&result, output) {
            Ok(()) => eprintln!("\nEquity curves written to: {}", output.display()),
            Err(e) => {
                eprintln!("error: failed to write equity curves: {e}");
                return ExitCode::from(1);
            }
        }
    }
    ExitCode::SUCCESS
}

fn print_summary(result: &BacktestResult, config: &RunConfig) {
    let strategy = Metrics::compute(&result.strategy, config.initial_cash);

    eprintln!("\n=== Strategy Results ===");
    eprintln!("Final Value:      {:.2}", strategy.final_value);
    eprintln!("Total Return:     {:.2}%", strategy.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", strategy.annualized_return * 100.0);
    eprintln!("Max Drawdown:     -{:.1}%", strategy.max_drawdown * 100.0);

    if let Some(benchmark_curve) = &result.benchmark {
        let benchmark = Metrics::compute(benchmark_curve, config.initial_cash);
        eprintln!("\n=== Benchmark Results ===");
        eprintln!("Final Value:      {:.2}", benchmark.final_value);
        eprintln!("Total Return:     {:.2}%", benchmark.total_return * 100.0);
        eprintln!("Annualized:       {:.2}%", benchmark.annualized_return * 100.0);
        eprintln!("Max Drawdown:     -{:.1}%", benchmark.max_drawdown * 100.0);
        eprintln!(
            "\nStrategy vs benchmark: {:+.2}%",
            (strategy.total_return - benchmark.total_return) * 100.0
        );
    }
}

fn write_equity_csv(result: &BacktestResult, output: &PathBuf) -> Result<(), FxSeasonError> {
    let benchmark_by_date: HashMap<_, _> = result
        .benchmark
        .iter()
        .flatten()
        .map(|p| (p.date, p.value))
        .collect();

    let mut wtr = csv::Writer::from_path(output).map_err(|e| FxSeasonError::Data {
        source_name: output.display().to_string(),
        reason: e.to_string(),
    })?;

    wtr.write_record(["date", "strategy", "benchmark"])
        .map_err(|e| FxSeasonError::Data {
            source_name: output.display().to_string(),
            reason: e.to_string(),
        })?;

    for point in &result.strategy {
        let benchmark_cell = benchmark_by_date
            .get(&point.date)
            .map(|v| format!("{v:.2}"))
            .unwrap_or_default();
        wtr.write_record([
            point.date.to_string(),
            format!("{:.2}", point.value),
            benchmark_cell,
        ])
        .map_err(|e| FxSeasonError::Data {
            source_name: output.display().to_string(),
            reason: e.to_string(),
        })?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let run_config = match build_run_config(&adapter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    eprintln!("\nRun configuration:");
    eprintln!("  pair:          {}", run_config.ticker);
    eprintln!(
        "  countries:     {} vs {}",
        run_config.country_a, run_config.country_b
    );
    eprintln!(
        "  period:        {} to {}",
        run_config.start_date, run_config.end_date
    );
    eprintln!("  initial cash:  {:.2}", run_config.initial_cash);
    eprintln!(
        "  position size: {:.2}%",
        run_config.trade_amount_percent * 100.0
    );
    eprintln!(
        "  benchmark:     {}",
        run_config.benchmark_ticker.as_deref().unwrap_or("(none)")
    );
    eprintln!(
        "  seasonality:   buy > {}, sell < {}",
        run_config.synthesis.buy_threshold, run_config.synthesis.sell_threshold
    );
    eprintln!(
        "  gdp momentum:  long > {}, short < {}, {} growth periods",
        run_config.momentum.long_threshold,
        run_config.momentum.short_threshold,
        run_config.momentum.n_periods_growth
    );
    eprintln!("  cooldown:      {} days", run_config.synthesis.cooldown_days);

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
