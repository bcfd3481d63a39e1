//! Backtest engine: positions and realized returns to strategy P&L.
//!
//! Convention: returns are simple returns against the previous row's price,
//! and the position held over (t-1, t] is the one decided at t-1. The first
//! row of every table has no return, so it is dropped and the cumulative
//! product starts from the second row.
//!
//! BacktestConfig carries the run-level parameters.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::hedge_ratio::HedgeRatio;
use crate::domain::signal::SignalRow;

pub const DEFAULT_TRANSACTION_COST: f64 = 0.002;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub split_ratio: f64,
    /// Fraction charged per unit of position change.
    pub transaction_cost: f64,
    /// Bars per year, used to annualize the Sharpe ratio.
    pub periods_per_year: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestRow {
    pub timestamp: NaiveDateTime,
    pub dependent: f64,
    pub independent: f64,
    pub spread: f64,
    pub mean: f64,
    pub std: f64,
    pub zscore: Option<f64>,
    /// Position the row's signal asked for; `None` when it held.
    pub signal: Option<f64>,
    pub position: f64,
    pub return_dependent: f64,
    pub return_independent: f64,
    /// Net of `cost`.
    pub strategy_return: f64,
    pub trade: f64,
    pub cost: f64,
    pub cumulative_return: f64,
}

pub fn run_backtest(rows: &[SignalRow], hedge_ratio: HedgeRatio, transaction_cost: f64) -> Vec<BacktestRow> {
    let h = hedge_ratio.value();
    let mut cumulative = 1.0_f64;

    rows.windows(2)
        .map(|w| {
            let (prev, curr) = (&w[0], &w[1]);
            let return_dependent = curr.row.dependent / prev.row.dependent - 1.0;
            let return_independent = curr.row.independent / prev.row.independent - 1.0;

            let trade = (curr.position - prev.position).abs();
            let cost = trade * transaction_cost;
            let strategy_return = prev.position * (return_dependent - h * return_independent) - cost;
            cumulative *= 1.0 + strategy_return;

            BacktestRow {
                timestamp: curr.row.timestamp,
                dependent: curr.row.dependent,
                independent: curr.row.independent,
                spread: curr.row.spread,
                mean: curr.row.mean,
                std: curr.row.std,
                zscore: curr.row.zscore,
                signal: curr.signal.target(),
                position: curr.position,
                return_dependent,
                return_independent,
                strategy_return,
                trade,
                cost,
                cumulative_return: cumulative,
            }
        })
        .collect()
}
