//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::typst_report::TypstReportAdapter;
use crate::domain::backtest::{BacktestConfig, DEFAULT_TRANSACTION_COST};
use crate::domain::config_validation::{
    parse_date, validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::PairtraderError;
use crate::domain::hedge_ratio::DEFAULT_DOWNSAMPLE_INTERVAL;
use crate::domain::metrics::{Evaluation, DEFAULT_PERIODS_PER_YEAR};
use crate::domain::pair_data::DEFAULT_SPLIT_RATIO;
use crate::domain::pipeline::run_pair;
use crate::domain::signal::{
    SignalParams, SizingMode, DEFAULT_ENTRY_THRESHOLD, DEFAULT_EXIT_THRESHOLD,
    DEFAULT_MAX_POSITION,
};
use crate::domain::spread::DEFAULT_WINDOW;
use crate::domain::strategy::PairStrategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "pairtrader", about = "Statistical pairs-trading backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a pair backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override [strategy] dependent
        #[arg(long)]
        dependent: Option<String>,
        /// Override [strategy] independent
        #[arg(long)]
        independent: Option<String>,
        /// CSV output table (overrides [report] csv_path)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Typst report (overrides [report] typst_path)
        #[arg(long)]
        report: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for symbol(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            dependent,
            independent,
            output,
            report,
            dry_run,
        } => {
            let overrides = SymbolOverrides {
                dependent: dependent.as_deref(),
                independent: independent.as_deref(),
            };
            if dry_run {
                run_dry_run(&config, &overrides)
            } else {
                run_backtest(&config, &overrides, output.as_deref(), report.as_deref())
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    }
}

/// Command-line replacements for the configured pair legs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymbolOverrides<'a> {
    pub dependent: Option<&'a str>,
    pub independent: Option<&'a str>,
}

fn report_error(e: &PairtraderError) -> ExitCode {
    eprintln!("error: {e}");
    e.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| report_error(&e))
}

/// Loads, validates and resolves the strategy and backtest parameters.
fn load_run(
    config_path: &Path,
    overrides: &SymbolOverrides,
) -> Result<(FileConfigAdapter, PairStrategy, BacktestConfig), ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;

    validate_backtest_config(&adapter).map_err(|e| report_error(&e))?;
    validate_strategy_config(&adapter).map_err(|e| report_error(&e))?;

    let strategy = build_strategy(&adapter)
        .and_then(|s| apply_overrides(s, overrides))
        .map_err(|e| report_error(&e))?;
    let bt_config = build_backtest_config(&adapter).map_err(|e| report_error(&e))?;

    Ok((adapter, strategy, bt_config))
}

fn run_backtest(
    config_path: &Path,
    overrides: &SymbolOverrides,
    output_path: Option<&Path>,
    report_path: Option<&Path>,
) -> ExitCode {
    let (adapter, strategy, bt_config) = match load_run(config_path, overrides) {
        Ok(run) => run,
        Err(code) => return code,
    };
    eprintln!("Loading strategy: {} ({})", strategy.name, strategy.pair_label());

    let data_port = match data_port_from_config(&adapter) {
        Ok(p) => p,
        Err(e) => return report_error(&e),
    };

    let csv_path = output_path
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_string("report", "csv_path").map(PathBuf::from));
    let typst_path = report_path
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_string("report", "typst_path").map(PathBuf::from));
    let template_path = adapter
        .get_string("report", "template_path")
        .map(PathBuf::from);

    let outputs = ReportOutputs {
        csv_path: csv_path.as_deref(),
        typst_path: typst_path.as_deref(),
        template_path: template_path.as_deref(),
    };

    run_backtest_pipeline(&data_port, &strategy, &bt_config, &outputs)
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, PairtraderError> {
    let start_date = parse_date(
        adapter.get_string("backtest", "start_date").as_deref(),
        "start_date",
    )?;
    let end_date = parse_date(
        adapter.get_string("backtest", "end_date").as_deref(),
        "end_date",
    )?;

    Ok(BacktestConfig {
        start_date,
        end_date,
        split_ratio: adapter.get_double("backtest", "split_ratio", DEFAULT_SPLIT_RATIO),
        transaction_cost: adapter.get_double(
            "backtest",
            "transaction_cost",
            DEFAULT_TRANSACTION_COST,
        ),
        periods_per_year: adapter.get_double(
            "backtest",
            "periods_per_year",
            DEFAULT_PERIODS_PER_YEAR,
        ),
    })
}

fn required_symbol(adapter: &dyn ConfigPort, key: &str) -> Result<String, PairtraderError> {
    adapter
        .get_string("strategy", key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PairtraderError::ConfigMissing {
            section: "strategy".into(),
            key: key.into(),
        })
}

pub fn build_strategy(adapter: &dyn ConfigPort) -> Result<PairStrategy, PairtraderError> {
    let dependent = required_symbol(adapter, "dependent")?;
    let independent = required_symbol(adapter, "independent")?;
    let name = adapter
        .get_string("strategy", "name")
        .unwrap_or_else(|| format!("{}/{}", dependent, independent));

    let sizing = match adapter.get_string("strategy", "sizing") {
        Some(s) => SizingMode::parse(&s).ok_or_else(|| PairtraderError::ConfigInvalid {
            section: "strategy".into(),
            key: "sizing".into(),
            reason: format!("unknown sizing mode '{}'", s.trim()),
        })?,
        None => SizingMode::default(),
    };

    Ok(PairStrategy {
        name,
        dependent,
        independent,
        window: adapter.get_int("strategy", "window", DEFAULT_WINDOW as i64).max(0) as usize,
        downsample_interval: adapter
            .get_int(
                "strategy",
                "downsample_interval",
                DEFAULT_DOWNSAMPLE_INTERVAL as i64,
            )
            .max(0) as usize,
        signal: SignalParams {
            entry_threshold: adapter.get_double(
                "strategy",
                "entry_threshold",
                DEFAULT_ENTRY_THRESHOLD,
            ),
            exit_threshold: adapter.get_double(
                "strategy",
                "exit_threshold",
                DEFAULT_EXIT_THRESHOLD,
            ),
            max_position: adapter.get_double("strategy", "max_position", DEFAULT_MAX_POSITION),
            sizing,
        },
    })
}

/// Replaces the configured legs with command-line symbols, rejecting a pair
/// that would regress a symbol on itself.
pub fn apply_overrides(
    mut strategy: PairStrategy,
    overrides: &SymbolOverrides,
) -> Result<PairStrategy, PairtraderError> {
    if let Some(dep) = overrides.dependent {
        strategy.dependent = dep.trim().to_string();
    }
    if let Some(indep) = overrides.independent {
        strategy.independent = indep.trim().to_string();
    }
    if strategy.dependent.eq_ignore_ascii_case(&strategy.independent) {
        return Err(PairtraderError::ConfigInvalid {
            section: "strategy".into(),
            key: "independent".into(),
            reason: "independent must differ from dependent".into(),
        });
    }
    Ok(strategy)
}

pub fn data_port_from_config(adapter: &dyn ConfigPort) -> Result<CsvAdapter, PairtraderError> {
    let path = adapter
        .get_string("data", "path")
        .ok_or_else(|| PairtraderError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;
    Ok(CsvAdapter::new(PathBuf::from(path)))
}

/// Where a backtest run writes its results. Unset paths are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportOutputs<'a> {
    pub csv_path: Option<&'a Path>,
    pub typst_path: Option<&'a Path>,
    pub template_path: Option<&'a Path>,
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    strategy: &PairStrategy,
    bt_config: &BacktestConfig,
    outputs: &ReportOutputs,
) -> ExitCode {
    // Stage 1: Fetch both legs
    let mut legs = Vec::with_capacity(2);
    for symbol in [&strategy.dependent, &strategy.independent] {
        match data_port.fetch_prices(symbol, bt_config.start_date, bt_config.end_date) {
            Ok(series) if series.is_empty() => {
                return report_error(&PairtraderError::NoData {
                    symbol: symbol.clone(),
                });
            }
            Ok(series) => {
                eprintln!("  {}: {} rows", symbol, series.len());
                legs.push(series);
            }
            Err(e) => return report_error(&e),
        }
    }

    // Stage 2: Merge, split, estimate and backtest
    eprintln!(
        "Running backtest: {}, {} to {}",
        strategy.pair_label(),
        bt_config.start_date,
        bt_config.end_date,
    );
    let report = match run_pair(&legs[0], &legs[1], strategy, bt_config) {
        Ok(r) => r,
        Err(e) => return report_error(&e),
    };

    // Stage 3: Console summary
    eprintln!("\n=== Pair ===");
    eprintln!("Aligned Rows:     {}", report.aligned_rows);
    eprintln!(
        "Hedge Ratio:      {:.6} ({} regression rows)",
        report.hedge_ratio.value(),
        report.hedge_ratio.observations()
    );
    print_evaluation("Training", &report.training.evaluation);
    print_evaluation("Test", &report.test.evaluation);

    // Stage 4: Write outputs
    if let Some(path) = outputs.csv_path {
        if let Err(e) = CsvReportAdapter.write(&report, strategy, path) {
            return report_error(&e);
        }
        eprintln!("\nOutput table written to: {}", path.display());
    }

    if let Some(path) = outputs.typst_path {
        let adapter = match outputs.template_path {
            Some(template) => {
                match TypstReportAdapter::with_template_file(bt_config.clone(), template) {
                    Ok(a) => a,
                    Err(e) => return report_error(&e),
                }
            }
            None => TypstReportAdapter::new(bt_config.clone()),
        };
        if let Err(e) = adapter.write(&report, strategy, path) {
            return report_error(&e);
        }
        eprintln!("Report written to: {}", path.display());
    }

    ExitCode::SUCCESS
}

fn print_evaluation(split: &str, evaluation: &Evaluation) {
    eprintln!("\n=== {} Results ===", split);
    eprintln!("Bars:             {}", evaluation.bars);
    eprintln!("Sharpe Ratio:     {}", evaluation.sharpe_ratio);
    eprintln!("Max Drawdown:     {:.2}%", evaluation.max_drawdown * 100.0);
    eprintln!("Total Return:     {:.2}%", evaluation.total_return * 100.0);
    eprintln!("Trades:           {}", evaluation.trade_count);
    eprintln!("Exposure:         {:.1}%", evaluation.exposure * 100.0);
    for note in &evaluation.notes {
        eprintln!("  note: {}", note);
    }
}

pub fn run_dry_run(config_path: &Path, overrides: &SymbolOverrides) -> ExitCode {
    let (adapter, strategy, bt_config) = match load_run(config_path, overrides) {
        Ok(run) => run,
        Err(code) => return code,
    };
    eprintln!("Config validated successfully");

    eprintln!("\nStrategy: {}", strategy.name);
    eprintln!("  dependent:           {}", strategy.dependent);
    eprintln!("  independent:         {}", strategy.independent);
    eprintln!("  window:              {}", strategy.window);
    eprintln!("  downsample_interval: {}", strategy.downsample_interval);
    eprintln!("  entry_threshold:     {}", strategy.signal.entry_threshold);
    eprintln!("  exit_threshold:      {}", strategy.signal.exit_threshold);
    eprintln!("  max_position:        {}", strategy.signal.max_position);
    eprintln!("  sizing:              {}", strategy.signal.sizing);

    eprintln!("\nBacktest:");
    eprintln!("  period:              {} to {}", bt_config.start_date, bt_config.end_date);
    eprintln!("  split_ratio:         {}", bt_config.split_ratio);
    eprintln!("  transaction_cost:    {}", bt_config.transaction_cost);
    eprintln!("  periods_per_year:    {}", bt_config.periods_per_year);

    match adapter.get_string("data", "path") {
        Some(path) => eprintln!("\nData: {}", path),
        None => {
            return report_error(&PairtraderError::ConfigMissing {
                section: "data".into(),
                key: "path".into(),
            });
        }
    }

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return report_error(&e);
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        return report_error(&e);
    }

    match build_strategy(&adapter) {
        Ok(strategy) => {
            eprintln!("\nPair:   {}", strategy.pair_label());
            eprintln!(
                "Signal: entry {} / exit {} / max {} ({})",
                strategy.signal.entry_threshold,
                strategy.signal.exit_threshold,
                strategy.signal.max_position,
                strategy.signal.sizing,
            );
        }
        Err(e) => return report_error(&e),
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let adapter = match data_port_from_config(&config) {
        Ok(a) => a,
        Err(e) => return report_error(&e),
    };

    let symbols = match adapter.list_symbols() {
        Ok(s) => s,
        Err(e) => return report_error(&e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

fn run_info(config_path: &Path, symbol: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let adapter = match data_port_from_config(&config) {
        Ok(a) => a,
        Err(e) => return report_error(&e),
    };

    let symbols = resolve_symbols(symbol, &config);
    if symbols.is_empty() {
        eprintln!("error: no symbols given (use --symbol or set [strategy] dependent/independent)");
        return ExitCode::from(2);
    }

    for s in &symbols {
        match adapter.get_data_range(s) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} rows, {} to {}", s, count, first, last);
            }
            Ok(None) => {
                eprintln!("{}: no data found", s);
            }
            Err(e) => {
                eprintln!("error querying {}: {}", s, e);
            }
        }
    }
    ExitCode::SUCCESS
}

/// `--symbol` if given, otherwise both configured legs.
pub fn resolve_symbols(symbol_override: Option<&str>, config: &dyn ConfigPort) -> Vec<String> {
    if let Some(s) = symbol_override {
        return vec![s.trim().to_string()];
    }

    ["dependent", "independent"]
        .iter()
        .filter_map(|key| config.get_string("strategy", key))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
