//! End-to-end pair run: merge, split, estimate, then spread → signal →
//! backtest → evaluate on each split.
//!
//! The hedge ratio is fitted on the training split only and reused as-is for
//! the test split; test prices never reach the estimator.

use crate::domain::backtest::{run_backtest, BacktestConfig, BacktestRow};
use crate::domain::error::PairtraderError;
use crate::domain::hedge_ratio::{estimate_hedge_ratio, HedgeRatio};
use crate::domain::metrics::Evaluation;
use crate::domain::pair_data::{merge, split, PairBar};
use crate::domain::price::PriceSeries;
use crate::domain::signal::generate_signals;
use crate::domain::spread::compute_zscores;
use crate::domain::strategy::PairStrategy;

#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult {
    /// Aligned rows fed into this split, before the window warmup.
    pub input_rows: usize,
    pub rows: Vec<BacktestRow>,
    pub evaluation: Evaluation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairReport {
    pub dependent: String,
    pub independent: String,
    pub aligned_rows: usize,
    pub hedge_ratio: HedgeRatio,
    pub training: SplitResult,
    pub test: SplitResult,
}

/// Runs spread, signal, backtest and evaluation over one split with an
/// already-estimated hedge ratio.
pub fn run_split(
    bars: &[PairBar],
    hedge_ratio: HedgeRatio,
    strategy: &PairStrategy,
    config: &BacktestConfig,
) -> SplitResult {
    let zscores = compute_zscores(bars, hedge_ratio, strategy.window);
    let signals = generate_signals(&zscores, &strategy.signal);
    let rows = run_backtest(&signals, hedge_ratio, config.transaction_cost);
    let evaluation = Evaluation::compute(&rows, config.periods_per_year);
    SplitResult {
        input_rows: bars.len(),
        rows,
        evaluation,
    }
}

pub fn run_pair(
    dependent: &PriceSeries,
    independent: &PriceSeries,
    strategy: &PairStrategy,
    config: &BacktestConfig,
) -> Result<PairReport, PairtraderError> {
    let table = merge(dependent, independent);
    if table.is_empty() {
        return Err(PairtraderError::Data {
            reason: format!(
                "{} and {} share no timestamps",
                dependent.symbol, independent.symbol
            ),
        });
    }

    let halves = split(&table, config.split_ratio);
    let hedge_ratio = estimate_hedge_ratio(&halves.training, strategy.downsample_interval)?;
    tracing::info!(
        hedge_ratio = hedge_ratio.value(),
        training_rows = halves.training.len(),
        test_rows = halves.test.len(),
        "estimated hedge ratio on training split"
    );

    let training = run_split(&halves.training, hedge_ratio, strategy, config);
    let test = run_split(&halves.test, hedge_ratio, strategy, config);

    Ok(PairReport {
        dependent: dependent.symbol.clone(),
        independent: independent.symbol.clone(),
        aligned_rows: table.len(),
        hedge_ratio,
        training,
        test,
    })
}
