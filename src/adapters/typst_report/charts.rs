//! Line charts for reports, drawn with Typst path primitives.

use crate::domain::backtest::BacktestRow;

const WIDTH: f64 = 500.0;
const HEIGHT: f64 = 200.0;
const PADDING: f64 = 40.0;

/// Polyline figure of `values`, scaled to fill the plot area.
pub fn format_line_chart(values: &[f64], caption: &str, stroke: &str) -> String {
    if values.is_empty() {
        return format!("_No data for {}._\n", caption.to_lowercase());
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;

    let range = max - min;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let scale_x = if values.len() > 1 {
        plot_width / (values.len() - 1) as f64
    } else {
        0.0
    };

    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = i as f64 * scale_x;
            let y = plot_height - (v - min) * scale_y;
            format!("({:.1}pt, {:.1}pt)", x, y)
        })
        .collect();

    format!(
        r#"#figure(
  box(
    width: {w:.0}pt,
    height: {h:.0}pt,
    fill: white,
    {{
      place(dx: {p:.0}pt, dy: {p:.0}pt, line(start: (0pt, 0pt), end: (0pt, {ph:.0}pt)))
      place(dx: {p:.0}pt, dy: {bottom:.0}pt, line(start: (0pt, 0pt), end: ({pw:.0}pt, 0pt)))
      place(dx: {p:.0}pt, dy: {p:.0}pt, path(
        stroke: {stroke} + 1pt,
        {points}
      ))
    }}
  ),
  caption: [{caption} (min {min:.4}, max {max:.4})]
)
"#,
        w = WIDTH,
        h = HEIGHT,
        p = PADDING,
        ph = plot_height,
        pw = plot_width,
        bottom = HEIGHT - PADDING,
        stroke = stroke,
        points = points.join(", "),
        caption = caption,
        min = min,
        max = max,
    )
}

pub fn format_cumulative_chart(rows: &[BacktestRow], title: &str) -> String {
    let values: Vec<f64> = rows.iter().map(|r| r.cumulative_return).collect();
    format_line_chart(&values, &format!("{} Cumulative Return", title), "blue")
}

/// Drawdown series, (CR - running max) / running max, per bar.
pub fn drawdown_series(rows: &[BacktestRow]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    rows.iter()
        .map(|r| {
            peak = peak.max(r.cumulative_return);
            if peak > 0.0 {
                (r.cumulative_return - peak) / peak
            } else {
                0.0
            }
        })
        .collect()
}

pub fn format_drawdown_chart(rows: &[BacktestRow], title: &str) -> String {
    format_line_chart(&drawdown_series(rows), &format!("{} Drawdown", title), "red")
}
