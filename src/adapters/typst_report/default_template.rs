//! Default Typst report template.
//!
//! Built-in Typst report markup with `{{PLACEHOLDER}}` substitution.

const DEFAULT_TEMPLATE: &str = r#"#set page(paper: "a4", margin: 2cm)
#set text(size: 10pt)

= Pairs Trading Report: {{PAIR}}

== Parameters

{{PARAMETER_SUMMARY}}

== Performance

{{METRICS_TABLE}}

=== Notes

{{NOTES}}

== Training Split

{{TRAINING_CUMULATIVE_CHART}}

{{TRAINING_DRAWDOWN_CHART}}

== Test Split

{{TEST_CUMULATIVE_CHART}}

{{TEST_DRAWDOWN_CHART}}
"#;

pub fn template() -> &'static str {
    DEFAULT_TEMPLATE
}
