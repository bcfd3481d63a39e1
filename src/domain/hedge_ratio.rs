//! Hedge-ratio estimation by ordinary least squares.
//!
//! Fits `dependent = beta * independent + alpha` over the training rows and
//! keeps only `beta`. Long histories can be thinned by taking every Nth row
//! (by position) before fitting.

use crate::domain::error::EstimationError;
use crate::domain::pair_data::PairBar;

pub const DEFAULT_DOWNSAMPLE_INTERVAL: usize = 10;
const MIN_OBSERVATIONS: usize = 2;

/// Regression slope estimated once from the training split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HedgeRatio {
    value: f64,
    observations: usize,
}

impl HedgeRatio {
    /// A fixed hedge ratio that did not come from a regression.
    pub fn fixed(value: f64) -> Self {
        Self {
            value,
            observations: 0,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Rows the regression was fitted on (after downsampling).
    pub fn observations(&self) -> usize {
        self.observations
    }
}

/// Every `interval`-th row starting at the first. An interval of 0 or 1
/// keeps all rows.
pub fn downsample(rows: &[PairBar], interval: usize) -> Vec<PairBar> {
    if interval <= 1 {
        return rows.to_vec();
    }
    rows.iter().step_by(interval).copied().collect()
}

pub fn estimate_hedge_ratio(
    training: &[PairBar],
    downsample_interval: usize,
) -> Result<HedgeRatio, EstimationError> {
    let sample = downsample(training, downsample_interval);
    let n = sample.len();
    if n < MIN_OBSERVATIONS {
        return Err(EstimationError::InsufficientObservations {
            have: n,
            need: MIN_OBSERVATIONS,
        });
    }

    let first_x = sample[0].independent;
    if sample.iter().all(|b| b.independent == first_x) {
        return Err(EstimationError::ZeroVariance {
            column: "independent".into(),
        });
    }

    let nf = n as f64;
    let mean_x = sample.iter().map(|b| b.independent).sum::<f64>() / nf;
    let mean_y = sample.iter().map(|b| b.dependent).sum::<f64>() / nf;

    let (sxy, sxx) = sample.iter().fold((0.0, 0.0), |(sxy, sxx), b| {
        let dx = b.independent - mean_x;
        let dy = b.dependent - mean_y;
        (sxy + dx * dy, sxx + dx * dx)
    });

    let beta = sxy / sxx;
    if !beta.is_finite() {
        return Err(EstimationError::ZeroVariance {
            column: "independent".into(),
        });
    }

    let alpha = mean_y - beta * mean_x;
    tracing::debug!(beta, alpha, observations = n, "fitted hedge ratio");

    Ok(HedgeRatio {
        value: beta,
        observations: n,
    })
}
