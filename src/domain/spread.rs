//! Spread and rolling z-score.
//!
//! Spread[t] = dependent[t] - h * independent[t]
//! Mean/Std over the trailing `window` rows ending at t (sample std).
//! ZScore[t] = (Spread[t] - Mean[t]) / Std[t], undefined when Std[t] == 0.
//! Warmup: the first (window - 1) rows produce no statistics and are dropped.

use chrono::NaiveDateTime;

use crate::domain::hedge_ratio::HedgeRatio;
use crate::domain::pair_data::PairBar;
use crate::domain::stats::{mean, sample_std};

pub const DEFAULT_WINDOW: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadRow {
    pub timestamp: NaiveDateTime,
    pub dependent: f64,
    pub independent: f64,
    pub spread: f64,
    pub mean: f64,
    pub std: f64,
    /// `None` when the window has zero dispersion: no signal for this row.
    pub zscore: Option<f64>,
}

pub fn spread(bar: &PairBar, hedge_ratio: HedgeRatio) -> f64 {
    bar.dependent - hedge_ratio.value() * bar.independent
}

/// Rolling z-score of the spread. Returns an empty table when there are
/// fewer than `window` rows, or when `window < 2` (no sample std exists).
pub fn compute_zscores(bars: &[PairBar], hedge_ratio: HedgeRatio, window: usize) -> Vec<SpreadRow> {
    if window < 2 || bars.len() < window {
        tracing::warn!(
            rows = bars.len(),
            window,
            "not enough rows to fill the rolling window; z-score table is empty"
        );
        return Vec::new();
    }

    let spreads: Vec<f64> = bars.iter().map(|b| spread(b, hedge_ratio)).collect();
    let mut rows = Vec::with_capacity(bars.len() + 1 - window);
    let mut undefined = 0usize;

    for i in (window - 1)..bars.len() {
        let trailing = &spreads[i + 1 - window..=i];
        let (Some(m), Some(s)) = (mean(trailing), sample_std(trailing)) else {
            continue;
        };
        if !spreads[i].is_finite() || !m.is_finite() || !s.is_finite() {
            continue;
        }

        let zscore = if s > 0.0 {
            Some((spreads[i] - m) / s).filter(|z| z.is_finite())
        } else {
            None
        };
        if zscore.is_none() {
            undefined += 1;
        }

        rows.push(SpreadRow {
            timestamp: bars[i].timestamp,
            dependent: bars[i].dependent,
            independent: bars[i].independent,
            spread: spreads[i],
            mean: m,
            std: s,
            zscore,
        });
    }

    if undefined > 0 {
        tracing::debug!(undefined, "rows with zero rolling dispersion carry no signal");
    }

    rows
}
