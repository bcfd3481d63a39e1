//! Per-instrument price series.

use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub price: f64,
}

/// Time-ordered prices for one symbol. Timestamps are strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series from points in any order. Points are sorted by
    /// timestamp; for a repeated timestamp the last point supplied wins.
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        // Stable sort keeps supply order among equal timestamps.
        points.sort_by_key(|p| p.timestamp);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.timestamp == point.timestamp => *last = point,
                _ => deduped.push(point),
            }
        }
        Self {
            symbol: symbol.into(),
            points: deduped,
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.points.first().map(|p| p.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.points.last().map(|p| p.timestamp)
    }
}

/// Parses the timestamp formats accepted in price files: full date-time with
/// a space or `T` separator, or a bare date which maps to midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
