//! Typst report generation.
//!
//! Reads a Typst template (either the built-in default or a custom file),
//! resolves all `{{PLACEHOLDER}}` markers by calling helpers from `charts`
//! and `tables`, and writes the final `.typ` file.

pub mod charts;
pub mod default_template;
pub mod tables;

use std::fs;
use std::path::Path;

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::PairtraderError;
use crate::domain::pipeline::PairReport;
use crate::domain::strategy::PairStrategy;
use crate::ports::report_port::ReportPort;

/// Context for resolving template placeholders.
pub struct ReportContext<'a> {
    pub report: &'a PairReport,
    pub strategy: &'a PairStrategy,
    pub config: &'a BacktestConfig,
}

/// Resolve all `{{PLACEHOLDER}}`s in the given template string and return
/// the final Typst markup ready to be written to a `.typ` file.
pub fn resolve(template: &str, ctx: &ReportContext) -> String {
    let report = ctx.report;
    let training = &report.training;
    let test = &report.test;

    let replacements = [
        (
            "{{PAIR}}",
            format!("{} / {}", report.dependent, report.independent),
        ),
        (
            "{{PARAMETER_SUMMARY}}",
            tables::render_parameter_summary(report, ctx.strategy, ctx.config),
        ),
        (
            "{{METRICS_TABLE}}",
            tables::render_metrics_table(&training.evaluation, &test.evaluation),
        ),
        (
            "{{NOTES}}",
            tables::render_notes(&training.evaluation, &test.evaluation),
        ),
        (
            "{{TRAINING_CUMULATIVE_CHART}}",
            charts::format_cumulative_chart(&training.rows, "Training"),
        ),
        (
            "{{TRAINING_DRAWDOWN_CHART}}",
            charts::format_drawdown_chart(&training.rows, "Training"),
        ),
        (
            "{{TEST_CUMULATIVE_CHART}}",
            charts::format_cumulative_chart(&test.rows, "Test"),
        ),
        (
            "{{TEST_DRAWDOWN_CHART}}",
            charts::format_drawdown_chart(&test.rows, "Test"),
        ),
    ];

    let mut output = template.to_string();
    for (placeholder, value) in &replacements {
        output = output.replace(*placeholder, value);
    }
    output
}

/// Writes a Typst document for a pair run, from the default template or a
/// user-supplied one.
pub struct TypstReportAdapter {
    config: BacktestConfig,
    template: Option<String>,
}

impl TypstReportAdapter {
    pub fn new(config: BacktestConfig) -> Self {
        Self {
            config,
            template: None,
        }
    }

    pub fn with_template_file(
        config: BacktestConfig,
        template_path: &Path,
    ) -> Result<Self, PairtraderError> {
        let template = fs::read_to_string(template_path).map_err(|e| PairtraderError::Report {
            reason: format!(
                "failed to read template {}: {}",
                template_path.display(),
                e
            ),
        })?;
        Ok(Self {
            config,
            template: Some(template),
        })
    }

    fn template(&self) -> &str {
        self.template
            .as_deref()
            .unwrap_or(default_template::template())
    }
}

impl ReportPort for TypstReportAdapter {
    fn write(
        &self,
        report: &PairReport,
        strategy: &PairStrategy,
        output_path: &Path,
    ) -> Result<(), PairtraderError> {
        let ctx = ReportContext {
            report,
            strategy,
            config: &self.config,
        };
        let content = resolve(self.template(), &ctx);
        fs::write(output_path, content).map_err(|e| PairtraderError::Report {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        })
    }
}
