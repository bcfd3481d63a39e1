//! Table formatting for reports.
//!
//! Provides functions to generate Typst markup for:
//! - Run parameter summary
//! - Training vs test metrics table
//! - Evaluation notes

use crate::domain::backtest::BacktestConfig;
use crate::domain::metrics::Evaluation;
use crate::domain::pipeline::PairReport;
use crate::domain::strategy::PairStrategy;

pub fn render_parameter_summary(
    report: &PairReport,
    strategy: &PairStrategy,
    config: &BacktestConfig,
) -> String {
    let rows = [
        ("Strategy", strategy.name.clone()),
        ("Pair", format!("{} / {}", report.dependent, report.independent)),
        ("Period", format!("{} to {}", config.start_date, config.end_date)),
        ("Aligned Rows", report.aligned_rows.to_string()),
        ("Split Ratio", format!("{:.2}", config.split_ratio)),
        ("Hedge Ratio", format!("{:.6}", report.hedge_ratio.value())),
        ("Regression Rows", report.hedge_ratio.observations().to_string()),
        ("Downsample Interval", strategy.downsample_interval.to_string()),
        ("Window", strategy.window.to_string()),
        ("Entry Threshold", format!("{:.2}", strategy.signal.entry_threshold)),
        ("Exit Threshold", format!("{:.2}", strategy.signal.exit_threshold)),
        ("Max Position", format!("{:.2}", strategy.signal.max_position)),
        ("Sizing", strategy.signal.sizing.to_string()),
        ("Transaction Cost", format!("{:.4}", config.transaction_cost)),
        ("Periods / Year", format!("{:.0}", config.periods_per_year)),
    ];

    let mut output = String::from("#table(\n  columns: 2,\n  [*Parameter*], [*Value*],\n");
    for (label, value) in rows {
        output.push_str(&format!("  [{}], [{}],\n", label, escape(&value)));
    }
    output.push_str(")\n");
    output
}

pub fn render_metrics_table(training: &Evaluation, test: &Evaluation) -> String {
    let mut output = String::from("#table(\n  columns: 3,\n  [*Metric*], [*Training*], [*Test*],\n");

    let mut row = |label: &str, f: &dyn Fn(&Evaluation) -> String| {
        output.push_str(&format!("  [{}], [{}], [{}],\n", label, f(training), f(test)));
    };
    row("Bars", &|e| e.bars.to_string());
    row("Sharpe Ratio", &|e| escape(&e.sharpe_ratio.to_string()));
    row("Max Drawdown", &|e| format!("{:.2}%", e.max_drawdown * 100.0));
    row("Max DD Duration (bars)", &|e| e.max_drawdown_duration.to_string());
    row("Total Return", &|e| format!("{:.2}%", e.total_return * 100.0));
    row("Trades", &|e| e.trade_count.to_string());
    row("Total Cost", &|e| format!("{:.4}", e.total_cost));
    row("Exposure", &|e| format!("{:.1}%", e.exposure * 100.0));

    output.push_str(")\n");
    output
}

pub fn render_notes(training: &Evaluation, test: &Evaluation) -> String {
    let notes: Vec<String> = training
        .notes
        .iter()
        .map(|n| format!("- Training: {}\n", escape(n)))
        .chain(test.notes.iter().map(|n| format!("- Test: {}\n", escape(n))))
        .collect();
    if notes.is_empty() {
        "_None._\n".to_string()
    } else {
        notes.concat()
    }
}

/// Escapes characters Typst treats as markup inside content blocks.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '[' | ']' | '#' | '*' | '_' | '$' | '@' | '<' | '>' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
