//! Pair strategy definition.

use crate::domain::signal::SignalParams;

#[derive(Debug, Clone, PartialEq)]
pub struct PairStrategy {
    pub name: String,
    /// Regressed (Y) leg.
    pub dependent: String,
    /// Regressor (X) leg, hedged by the hedge ratio.
    pub independent: String,
    /// Rolling z-score window, in rows.
    pub window: usize,
    pub downsample_interval: usize,
    pub signal: SignalParams,
}

impl PairStrategy {
    pub fn pair_label(&self) -> String {
        format!("{}/{}", self.dependent, self.independent)
    }
}
