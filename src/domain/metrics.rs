//! Performance metrics for a backtested split.

use std::fmt;

use crate::domain::backtest::BacktestRow;
use crate::domain::stats::{mean, sample_std};

/// Minute bars in one regular US equity session.
pub const DEFAULT_PERIODS_PER_YEAR: f64 = 390.0;

/// Annualized Sharpe ratio, or the reason it could not be computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SharpeRatio {
    Defined(f64),
    Undefined(&'static str),
}

impl SharpeRatio {
    pub fn value(&self) -> Option<f64> {
        match *self {
            SharpeRatio::Defined(v) => Some(v),
            SharpeRatio::Undefined(_) => None,
        }
    }
}

impl fmt::Display for SharpeRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SharpeRatio::Defined(v) => write!(f, "{:.4}", v),
            SharpeRatio::Undefined(reason) => write!(f, "undefined ({})", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub sharpe_ratio: SharpeRatio,
    /// Worst peak-to-trough decline as a fraction; always <= 0.
    pub max_drawdown: f64,
    /// Longest run of bars spent below the running peak.
    pub max_drawdown_duration: usize,
    pub total_return: f64,
    pub trade_count: usize,
    pub total_cost: f64,
    /// Fraction of bars with a nonzero position.
    pub exposure: f64,
    pub bars: usize,
    pub notes: Vec<String>,
}

impl Evaluation {
    pub fn compute(rows: &[BacktestRow], periods_per_year: f64) -> Self {
        let mut notes = Vec::new();

        let sharpe_ratio = compute_sharpe(rows, periods_per_year);
        if let SharpeRatio::Undefined(reason) = sharpe_ratio {
            tracing::warn!(reason, bars = rows.len(), "sharpe ratio undefined");
            notes.push(format!("sharpe ratio undefined: {}", reason));
        }

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(rows);

        let total_return = rows.last().map(|r| r.cumulative_return - 1.0).unwrap_or(0.0);
        let trade_count = rows.iter().filter(|r| r.trade > 0.0).count();
        let total_cost = rows.iter().map(|r| r.cost).sum();
        let exposure = if rows.is_empty() {
            0.0
        } else {
            rows.iter().filter(|r| r.position != 0.0).count() as f64 / rows.len() as f64
        };

        if rows.is_empty() {
            notes.push("no backtest rows: split shorter than the rolling window".to_string());
        }

        Evaluation {
            sharpe_ratio,
            max_drawdown,
            max_drawdown_duration,
            total_return,
            trade_count,
            total_cost,
            exposure,
            bars: rows.len(),
            notes,
        }
    }
}

/// (mean * P) / (std * sqrt(P)) over the strategy returns, sample std.
pub fn compute_sharpe(rows: &[BacktestRow], periods_per_year: f64) -> SharpeRatio {
    let returns: Vec<f64> = rows
        .iter()
        .map(|r| r.strategy_return)
        .filter(|r| r.is_finite())
        .collect();

    let (Some(m), Some(s)) = (mean(&returns), sample_std(&returns)) else {
        return SharpeRatio::Undefined("fewer than two returns");
    };
    if s == 0.0 {
        return SharpeRatio::Undefined("zero return volatility");
    }

    let sharpe = (m * periods_per_year) / (s * periods_per_year.sqrt());
    if sharpe.is_finite() {
        SharpeRatio::Defined(sharpe)
    } else {
        SharpeRatio::Undefined("non-finite result")
    }
}

/// Max drawdown (<= 0) relative to the running maximum of the cumulative
/// return series, and the longest stretch spent below that maximum.
pub fn compute_drawdown(rows: &[BacktestRow]) -> (f64, usize) {
    let Some(first) = rows.first() else {
        return (0.0, 0);
    };

    let mut peak = first.cumulative_return;
    let mut max_dd = 0.0_f64;
    let mut current_duration = 0usize;
    let mut max_duration = 0usize;

    for row in rows {
        let cr = row.cumulative_return;
        if cr >= peak {
            peak = cr;
            current_duration = 0;
            continue;
        }
        if peak > 0.0 {
            let dd = (cr - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
        current_duration += 1;
        max_duration = max_duration.max(current_duration);
    }

    (max_dd, max_duration)
}
