//! Domain error types.

/// Failure to fit the hedge-ratio regression. Retrying with the same
/// training data cannot succeed, so callers abort the run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimationError {
    #[error("insufficient observations for regression: have {have}, need {need}")]
    InsufficientObservations { have: usize, need: usize },

    #[error("independent variable {column} has zero variance")]
    ZeroVariance { column: String },
}

/// Top-level error type for pairtrader.
#[derive(Debug, thiserror::Error)]
pub enum PairtraderError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("hedge ratio estimation failed: {0}")]
    Estimation(#[from] EstimationError),

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PairtraderError> for std::process::ExitCode {
    fn from(err: &PairtraderError) -> Self {
        let code: u8 = match err {
            PairtraderError::Io(_) => 1,
            PairtraderError::ConfigParse { .. }
            | PairtraderError::ConfigMissing { .. }
            | PairtraderError::ConfigInvalid { .. } => 2,
            PairtraderError::Data { .. } | PairtraderError::NoData { .. } => 3,
            PairtraderError::Estimation(_) => 4,
            PairtraderError::Report { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
