//! Aligned pair table and chronological train/test split.
//!
//! Two price series are inner-joined on timestamp: a timestamp missing from
//! either side, or carrying a price that is non-finite or not strictly
//! positive, does not make it into the table. Dropped timestamps are counted and logged but never treated as an
//! error.

use chrono::NaiveDateTime;
use std::cmp::Ordering;

use crate::domain::price::PriceSeries;

/// One aligned row: both legs priced at the same timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairBar {
    pub timestamp: NaiveDateTime,
    pub dependent: f64,
    pub independent: f64,
}

/// Training prefix and test suffix of an aligned table.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub training: Vec<PairBar>,
    pub test: Vec<PairBar>,
}

pub const DEFAULT_SPLIT_RATIO: f64 = 0.66;

// A zero or negative price makes the next simple return infinite.
fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// Inner-joins `dependent` and `independent` on timestamp.
pub fn merge(dependent: &PriceSeries, independent: &PriceSeries) -> Vec<PairBar> {
    let dep = dependent.points();
    let indep = independent.points();
    let mut table = Vec::with_capacity(dep.len().min(indep.len()));

    let (mut i, mut j) = (0, 0);
    let mut dropped_dependent = 0usize;
    let mut dropped_independent = 0usize;
    let mut dropped_invalid = 0usize;

    while i < dep.len() && j < indep.len() {
        match dep[i].timestamp.cmp(&indep[j].timestamp) {
            Ordering::Less => {
                dropped_dependent += 1;
                i += 1;
            }
            Ordering::Greater => {
                dropped_independent += 1;
                j += 1;
            }
            Ordering::Equal => {
                let (d, x) = (dep[i].price, indep[j].price);
                if is_valid_price(d) && is_valid_price(x) {
                    table.push(PairBar {
                        timestamp: dep[i].timestamp,
                        dependent: d,
                        independent: x,
                    });
                } else {
                    dropped_invalid += 1;
                }
                i += 1;
                j += 1;
            }
        }
    }
    dropped_dependent += dep.len() - i;
    dropped_independent += indep.len() - j;

    tracing::debug!(
        dependent = %dependent.symbol,
        independent = %independent.symbol,
        rows = table.len(),
        dropped_dependent,
        dropped_independent,
        dropped_invalid,
        "merged price series"
    );

    table
}

/// Splits at `floor(len * ratio)`: rows before the split point train, the
/// rest test. Both halves keep chronological order.
pub fn split(table: &[PairBar], ratio: f64) -> Split {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { DEFAULT_SPLIT_RATIO };
    let split_point = ((table.len() as f64) * ratio).floor() as usize;
    let split_point = split_point.min(table.len());
    Split {
        training: table[..split_point].to_vec(),
        test: table[split_point..].to_vec(),
    }
}
