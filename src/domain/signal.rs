//! Z-score thresholds to position sizes.
//!
//! Each row gets a [`Signal`] from its z-score alone. Positions come from a
//! left fold over the signals that carries the last position through
//! [`Signal::Hold`] rows, so row order matters.

use std::fmt;

use chrono::NaiveDateTime;

use crate::domain::spread::SpreadRow;

pub const DEFAULT_ENTRY_THRESHOLD: f64 = 2.5;
pub const DEFAULT_EXIT_THRESHOLD: f64 = 0.5;
pub const DEFAULT_MAX_POSITION: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizingMode {
    /// Size grows with the distance past the entry threshold.
    #[default]
    Scaled,
    /// Every entry takes the full `max_position`.
    Full,
}

impl SizingMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "scaled" | "partial" => Some(SizingMode::Scaled),
            "full" => Some(SizingMode::Full),
            _ => None,
        }
    }
}

impl fmt::Display for SizingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizingMode::Scaled => write!(f, "scaled"),
            SizingMode::Full => write!(f, "full"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalParams {
    pub entry_threshold: f64,
    pub exit_threshold: f64,
    pub max_position: f64,
    pub sizing: SizingMode,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            entry_threshold: DEFAULT_ENTRY_THRESHOLD,
            exit_threshold: DEFAULT_EXIT_THRESHOLD,
            max_position: DEFAULT_MAX_POSITION,
            sizing: SizingMode::Scaled,
        }
    }
}

/// Per-row trading decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    /// Move to this signed position (negative = short the spread).
    Enter(f64),
    /// Go flat.
    Exit,
    /// Dead zone or no z-score: keep whatever position is held.
    Hold,
}

impl Signal {
    /// Position this signal asks for, `None` for [`Signal::Hold`].
    pub fn target(&self) -> Option<f64> {
        match *self {
            Signal::Enter(size) => Some(size),
            Signal::Exit => Some(0.0),
            Signal::Hold => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalRow {
    pub row: SpreadRow,
    pub signal: Signal,
    pub position: f64,
}

impl SignalRow {
    pub fn timestamp(&self) -> NaiveDateTime {
        self.row.timestamp
    }
}

pub fn classify(zscore: Option<f64>, params: &SignalParams) -> Signal {
    let Some(z) = zscore.filter(|z| z.is_finite()) else {
        return Signal::Hold;
    };
    let entry = params.entry_threshold;

    if z > entry {
        Signal::Enter(-entry_size(z - entry, params))
    } else if z < -entry {
        Signal::Enter(entry_size(-z - entry, params))
    } else if z.abs() < params.exit_threshold {
        Signal::Exit
    } else {
        Signal::Hold
    }
}

fn entry_size(excess: f64, params: &SignalParams) -> f64 {
    match params.sizing {
        SizingMode::Scaled => (excess / params.entry_threshold).min(params.max_position),
        SizingMode::Full => params.max_position,
    }
}

/// Classifies every row and folds the signals into positions. The running
/// position starts flat, so undefined signals before the first crossing
/// yield 0.
pub fn generate_signals(rows: &[SpreadRow], params: &SignalParams) -> Vec<SignalRow> {
    let max = params.max_position;
    rows.iter()
        .scan(0.0_f64, |current, row| {
            let signal = classify(row.zscore, params);
            if let Some(target) = signal.target() {
                *current = target;
            }
            Some(SignalRow {
                row: *row,
                signal,
                position: current.clamp(-max, max),
            })
        })
        .collect()
}
