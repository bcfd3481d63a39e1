//! Report generation port trait.

use crate::domain::error::PairtraderError;
use crate::domain::pipeline::PairReport;
use crate::domain::strategy::PairStrategy;
use std::path::Path;

/// Port for writing the result of a pair backtest.
pub trait ReportPort {
    fn write(
        &self,
        report: &PairReport,
        strategy: &PairStrategy,
        output_path: &Path,
    ) -> Result<(), PairtraderError>;
}
