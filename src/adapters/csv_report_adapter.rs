//! CSV output table writer implementing ReportPort.
//!
//! One row per backtested bar for both splits, tagged by a leading `split`
//! column. Undefined z-scores and held signals are written as empty cells.

use serde::Serialize;
use std::path::Path;

use crate::domain::backtest::BacktestRow;
use crate::domain::error::PairtraderError;
use crate::domain::pipeline::PairReport;
use crate::domain::strategy::PairStrategy;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

const COLUMNS: [&str; 16] = [
    "split",
    "timestamp",
    "price_dependent",
    "price_independent",
    "spread",
    "mean",
    "std",
    "zscore",
    "signal",
    "position",
    "return_dependent",
    "return_independent",
    "strategy_return",
    "trade",
    "cost",
    "cumulative_return",
];

#[derive(Debug, Serialize)]
struct OutputRecord<'a> {
    split: &'a str,
    timestamp: String,
    price_dependent: f64,
    price_independent: f64,
    spread: f64,
    mean: f64,
    std: f64,
    zscore: Option<f64>,
    signal: Option<f64>,
    position: f64,
    return_dependent: f64,
    return_independent: f64,
    strategy_return: f64,
    trade: f64,
    cost: f64,
    cumulative_return: f64,
}

impl<'a> OutputRecord<'a> {
    fn new(split: &'a str, row: &BacktestRow) -> Self {
        Self {
            split,
            timestamp: row.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            price_dependent: row.dependent,
            price_independent: row.independent,
            spread: row.spread,
            mean: row.mean,
            std: row.std,
            zscore: row.zscore,
            signal: row.signal,
            position: row.position,
            return_dependent: row.return_dependent,
            return_independent: row.return_independent,
            strategy_return: row.strategy_return,
            trade: row.trade,
            cost: row.cost,
            cumulative_return: row.cumulative_return,
        }
    }
}

fn report_err(path: &Path, e: impl std::fmt::Display) -> PairtraderError {
    PairtraderError::Report {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        report: &PairReport,
        _strategy: &PairStrategy,
        output_path: &Path,
    ) -> Result<(), PairtraderError> {
        // Header written by hand so a run with no rows still yields one.
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(output_path)
            .map_err(|e| report_err(output_path, e))?;
        wtr.write_record(COLUMNS)
            .map_err(|e| report_err(output_path, e))?;

        let splits = [("training", &report.training.rows), ("test", &report.test.rows)];
        for (name, rows) in splits {
            for row in rows.iter() {
                wtr.serialize(OutputRecord::new(name, row))
                    .map_err(|e| report_err(output_path, e))?;
            }
        }

        wtr.flush()?;
        Ok(())
    }
}
