#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use pairtrader::domain::backtest::BacktestConfig;
use pairtrader::domain::error::PairtraderError;
use pairtrader::domain::pair_data::PairBar;
use pairtrader::domain::price::{PricePoint, PriceSeries};
use pairtrader::domain::signal::SignalParams;
use pairtrader::domain::strategy::PairStrategy;
use pairtrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, symbol: &str, prices: &[f64]) -> Self {
        self.data.insert(symbol.to_string(), make_points(prices));
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, PairtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(PairtraderError::Data {
                reason: reason.clone(),
            });
        }
        let points = self
            .data
            .get(symbol)
            .ok_or_else(|| PairtraderError::NoData {
                symbol: symbol.to_string(),
            })?
            .iter()
            .filter(|p| p.timestamp.date() >= start_date && p.timestamp.date() <= end_date)
            .copied()
            .collect();
        Ok(PriceSeries::new(symbol, points))
    }

    fn list_symbols(&self) -> Result<Vec<String>, PairtraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, PairtraderError> {
        match self.data.get(symbol) {
            Some(points) if !points.is_empty() => {
                let first = points.iter().map(|p| p.timestamp).min().unwrap();
                let last = points.iter().map(|p| p.timestamp).max().unwrap();
                Ok(Some((first, last, points.len())))
            }
            _ => Ok(None),
        }
    }
}

/// First bar of the synthetic session used by every helper here.
pub fn session_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

pub fn minute(i: usize) -> NaiveDateTime {
    session_start() + chrono::Duration::minutes(i as i64)
}

pub fn make_points(prices: &[f64]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PricePoint {
            timestamp: minute(i),
            price,
        })
        .collect()
}

pub fn make_series(symbol: &str, prices: &[f64]) -> PriceSeries {
    PriceSeries::new(symbol, make_points(prices))
}

pub fn make_bars(dependent: &[f64], independent: &[f64]) -> Vec<PairBar> {
    dependent
        .iter()
        .zip(independent)
        .enumerate()
        .map(|(i, (&d, &x))| PairBar {
            timestamp: minute(i),
            dependent: d,
            independent: x,
        })
        .collect()
}

/// Upward-drifting independent leg.
pub fn trending_prices(count: usize, start: f64, step: f64) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}

/// `independent + offset` plus a bounded sine wiggle, so the spread under a
/// hedge ratio of 1.0 oscillates around `offset`.
pub fn oscillating_dependent(independent: &[f64], offset: f64, amplitude: f64) -> Vec<f64> {
    independent
        .iter()
        .enumerate()
        .map(|(i, &x)| x + offset + amplitude * (0.7 * i as f64).sin())
        .collect()
}

pub fn make_strategy(window: usize, downsample_interval: usize) -> PairStrategy {
    PairStrategy {
        name: "Test Pair".into(),
        dependent: "DEP".into(),
        independent: "IND".into(),
        window,
        downsample_interval,
        signal: SignalParams::default(),
    }
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        split_ratio: 0.66,
        transaction_cost: 0.002,
        periods_per_year: 390.0,
    }
}
