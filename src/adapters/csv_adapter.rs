//! CSV price directory adapter.
//!
//! Serves one `<SYMBOL>.csv` file per instrument from a base directory, the
//! on-disk cache a downloader fills. Each file needs a header naming a
//! timestamp column (`timestamp`, `datetime`, `date` or `time`) and a price
//! column (`price` or `close`); other columns are ignored.

use crate::domain::error::PairtraderError;
use crate::domain::price::{parse_timestamp, PricePoint, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

const TIMESTAMP_COLUMNS: [&str; 4] = ["timestamp", "datetime", "date", "time"];
const PRICE_COLUMNS: [&str; 2] = ["price", "close"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_all(&self, symbol: &str) -> Result<PriceSeries, PairtraderError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            return Err(PairtraderError::NoData {
                symbol: symbol.to_string(),
            });
        }
        let content = fs::read_to_string(&path).map_err(|e| PairtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| PairtraderError::Data {
                reason: format!("CSV header error in {}: {}", path.display(), e),
            })?
            .clone();

        let find_column = |candidates: &[&str]| {
            headers
                .iter()
                .position(|h| candidates.contains(&h.trim().to_lowercase().as_str()))
        };
        let ts_col = find_column(&TIMESTAMP_COLUMNS[..]).ok_or_else(|| PairtraderError::Data {
            reason: format!("{}: missing timestamp column", path.display()),
        })?;
        let price_col = find_column(&PRICE_COLUMNS[..]).ok_or_else(|| PairtraderError::Data {
            reason: format!("{}: missing price column", path.display()),
        })?;

        let mut points = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| PairtraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let ts_str = record.get(ts_col).unwrap_or_default();
            let timestamp = parse_timestamp(ts_str).ok_or_else(|| PairtraderError::Data {
                reason: format!("{} row {}: invalid timestamp '{}'", symbol, line + 1, ts_str),
            })?;

            let price_str = record.get(price_col).unwrap_or_default().trim();
            // Blank cells are gaps, not errors; the merge drops them later.
            let price = if price_str.is_empty() {
                f64::NAN
            } else {
                price_str.parse::<f64>().map_err(|e| PairtraderError::Data {
                    reason: format!("{} row {}: invalid price value: {}", symbol, line + 1, e),
                })?
            };

            points.push(PricePoint { timestamp, price });
        }

        Ok(PriceSeries::new(symbol, points))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, PairtraderError> {
        let all = self.read_all(symbol)?;
        let points = all
            .points()
            .iter()
            .filter(|p| {
                let d = p.timestamp.date();
                d >= start_date && d <= end_date
            })
            .copied()
            .collect();
        Ok(PriceSeries::new(symbol, points))
    }

    fn list_symbols(&self) -> Result<Vec<String>, PairtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| PairtraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PairtraderError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, PairtraderError> {
        let series = match self.read_all(symbol) {
            Ok(s) => s,
            Err(PairtraderError::NoData { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        match (series.first_timestamp(), series.last_timestamp()) {
            (Some(first), Some(last)) => Ok(Some((first, last, series.len()))),
            _ => Ok(None),
        }
    }
}
