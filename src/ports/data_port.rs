//! Price data access port trait.
//!
//! Whatever sits behind this port (a broker download, an on-disk cache) is
//! expected to hand back one time-ordered series per symbol.

use crate::domain::error::PairtraderError;
use crate::domain::price::PriceSeries;
use chrono::{NaiveDate, NaiveDateTime};

pub trait DataPort {
    /// Prices for `symbol` with timestamps falling on `start_date` through
    /// `end_date` inclusive.
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, PairtraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, PairtraderError>;

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, PairtraderError>;
}
