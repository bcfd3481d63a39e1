//! Integration tests for the pair pipeline.
//!
//! Tests cover:
//! - Spread spike scenario: short entry at the first crossing, held until the
//!   z-score returns inside the exit band
//! - Training/test isolation of the hedge ratio
//! - Transaction costs charged only on position changes
//! - Full pipeline from a mock data port through the report adapters

mod common;

use approx::assert_relative_eq;
use common::*;
use pairtrader::adapters::csv_report_adapter::CsvReportAdapter;
use pairtrader::adapters::typst_report::TypstReportAdapter;
use pairtrader::domain::backtest::run_backtest;
use pairtrader::domain::error::{EstimationError, PairtraderError};
use pairtrader::domain::hedge_ratio::HedgeRatio;
use pairtrader::domain::pipeline::{run_pair, run_split};
use pairtrader::domain::signal::{generate_signals, SignalParams};
use pairtrader::domain::spread::{compute_zscores, SpreadRow};
use pairtrader::ports::data_port::DataPort;
use pairtrader::ports::report_port::ReportPort;

const POINTS: usize = 400;
const SPIKE_START: usize = 300;
const SPIKE_LEN: usize = 5;

fn spiked_pair() -> (Vec<f64>, Vec<f64>) {
    let independent = trending_prices(POINTS, 100.0, 0.05);
    let mut dependent = oscillating_dependent(&independent, 1.0, 0.5);
    for price in &mut dependent[SPIKE_START..SPIKE_START + SPIKE_LEN] {
        *price += 5.0;
    }
    (dependent, independent)
}

mod spread_spike_scenario {
    use super::*;

    fn scenario_params() -> SignalParams {
        SignalParams {
            entry_threshold: 2.5,
            exit_threshold: 0.5,
            ..SignalParams::default()
        }
    }

    #[test]
    fn price_spike_opens_short_and_holds_until_exit_band() {
        let (dependent, independent) = spiked_pair();
        let bars = make_bars(&dependent, &independent);
        let zscores = compute_zscores(&bars, HedgeRatio::fixed(1.0), 20);
        assert_eq!(zscores.len(), POINTS - 19);

        let signals = generate_signals(&zscores, &scenario_params());
        let z: Vec<f64> = zscores.iter().map(|r| r.zscore.unwrap()).collect();

        let first_cross = z.iter().position(|&v| v > 2.5).unwrap();
        assert_eq!(signals[first_cross].timestamp(), minute(SPIKE_START));
        assert!(signals[..first_cross].iter().all(|r| r.position == 0.0));
        assert!(signals[first_cross].position < 0.0);

        let exit = (first_cross + 1..z.len())
            .find(|&i| z[i].abs() < 0.5)
            .unwrap();
        for row in &signals[first_cross..exit] {
            assert!(row.position < 0.0, "short dropped early at {}", row.timestamp());
        }
        assert_eq!(signals[exit].position, 0.0);
    }

    #[test]
    fn five_rows_at_three_sigma_hold_short_through_dead_zone() {
        let independent = trending_prices(60, 100.0, 0.05);
        let dependent = oscillating_dependent(&independent, 1.0, 0.5);
        let bars = make_bars(&dependent, &independent);
        let mut rows: Vec<SpreadRow> = compute_zscores(&bars, HedgeRatio::fixed(1.0), 20);
        assert_eq!(rows.len(), 41);

        let zs = [
            0.1, 0.3, 3.0, 3.0, 3.0, 3.0, 3.0, 2.0, 1.2, -0.8, 0.6, 0.2, 0.1,
        ];
        for (row, &z) in rows.iter_mut().zip(zs.iter()) {
            row.zscore = Some(z);
        }

        let signals = generate_signals(&rows[..zs.len()], &scenario_params());
        let positions: Vec<f64> = signals.iter().map(|r| r.position).collect();

        assert_eq!(positions[..2], [0.0, 0.0]);
        for &p in &positions[2..11] {
            assert_relative_eq!(p, -0.2, epsilon = 1e-12);
        }
        assert_eq!(positions[11..], [0.0, 0.0]);
    }

    #[test]
    fn spike_trades_pay_cost_only_on_changes() {
        let (dependent, independent) = spiked_pair();
        let bars = make_bars(&dependent, &independent);
        let strategy = make_strategy(20, 1);
        let result = run_split(&bars, HedgeRatio::fixed(1.0), &strategy, &sample_config());

        assert!(result.evaluation.trade_count >= 2);
        let mut prev_position = 0.0;
        for row in &result.rows {
            if row.position == prev_position {
                assert_eq!(row.cost, 0.0);
                assert_eq!(row.trade, 0.0);
            } else {
                assert_relative_eq!(row.trade, (row.position - prev_position).abs(), epsilon = 1e-12);
                assert_relative_eq!(row.cost, row.trade * 0.002, epsilon = 1e-12);
            }
            prev_position = row.position;
        }
    }
}

mod training_test_isolation {
    use super::*;

    #[test]
    fn test_prices_do_not_move_hedge_ratio() {
        let (dependent, independent) = spiked_pair();
        let config = sample_config();
        let strategy = make_strategy(20, 10);

        let base = run_pair(
            &make_series("DEP", &dependent),
            &make_series("IND", &independent),
            &strategy,
            &config,
        )
        .unwrap();

        let training_len = (POINTS as f64 * config.split_ratio).floor() as usize;
        let mut shocked_dep = dependent.clone();
        let mut shocked_ind = independent.clone();
        for i in training_len..POINTS {
            shocked_dep[i] *= 3.0;
            shocked_ind[i] += 40.0;
        }
        let shocked = run_pair(
            &make_series("DEP", &shocked_dep),
            &make_series("IND", &shocked_ind),
            &strategy,
            &config,
        )
        .unwrap();

        assert_eq!(base.hedge_ratio, shocked.hedge_ratio);
        assert_eq!(base.training, shocked.training);
        assert_ne!(base.test.rows, shocked.test.rows);
    }

    #[test]
    fn hedge_ratio_fitted_on_downsampled_training_rows() {
        let (dependent, independent) = spiked_pair();
        let report = run_pair(
            &make_series("DEP", &dependent),
            &make_series("IND", &independent),
            &make_strategy(20, 10),
            &sample_config(),
        )
        .unwrap();

        // 264 training rows, every 10th starting at the first
        assert_eq!(report.aligned_rows, POINTS);
        assert_eq!(report.training.input_rows, 264);
        assert_eq!(report.test.input_rows, 136);
        assert_eq!(report.hedge_ratio.observations(), 27);
        assert!((report.hedge_ratio.value() - 1.0).abs() < 0.1);
    }

    #[test]
    fn flat_training_leg_is_estimation_error() {
        let independent = vec![50.0; 100];
        let dependent = trending_prices(100, 10.0, 0.1);
        let err = run_pair(
            &make_series("DEP", &dependent),
            &make_series("IND", &independent),
            &make_strategy(20, 1),
            &sample_config(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PairtraderError::Estimation(EstimationError::ZeroVariance { .. })
        ));
    }

    #[test]
    fn disjoint_timestamps_are_data_error() {
        let dep = make_series("DEP", &[1.0, 2.0]);
        let ind = pairtrader::domain::price::PriceSeries::new(
            "IND",
            make_points(&[1.0, 2.0, 3.0, 4.0])[2..].to_vec(),
        );
        let err = run_pair(&dep, &ind, &make_strategy(20, 1), &sample_config()).unwrap_err();
        assert!(matches!(err, PairtraderError::Data { .. }));
    }
}

mod backtest_conventions {
    use super::*;

    #[test]
    fn first_row_of_each_split_is_dropped() {
        let (dependent, independent) = spiked_pair();
        let report = run_pair(
            &make_series("DEP", &dependent),
            &make_series("IND", &independent),
            &make_strategy(20, 10),
            &sample_config(),
        )
        .unwrap();

        // window warmup (19 rows) plus the first return row
        assert_eq!(report.training.rows.len(), 264 - 19 - 1);
        assert_eq!(report.test.rows.len(), 136 - 19 - 1);
        assert_eq!(report.test.rows[0].timestamp, minute(264 + 20));
    }

    #[test]
    fn cumulative_return_reconstructs_strategy_returns() {
        let (dependent, independent) = spiked_pair();
        let bars = make_bars(&dependent, &independent);
        let signals = generate_signals(
            &compute_zscores(&bars, HedgeRatio::fixed(1.0), 20),
            &SignalParams::default(),
        );
        let rows = run_backtest(&signals, HedgeRatio::fixed(1.0), 0.002);

        assert_relative_eq!(rows[0].cumulative_return, 1.0 + rows[0].strategy_return, epsilon = 1e-12);
        for w in rows.windows(2) {
            let implied = w[1].cumulative_return / w[0].cumulative_return - 1.0;
            assert_relative_eq!(implied, w[1].strategy_return, epsilon = 1e-9);
        }
        assert!(rows.iter().all(|r| r.position.abs() <= 1.0));
        assert!(rows.iter().map(|r| r.cost).sum::<f64>() > 0.0);
    }
}

mod full_pipeline {
    use super::*;
    use pairtrader::cli::{run_backtest_pipeline, ReportOutputs};
    use tempfile::TempDir;

    fn exit_status(code: std::process::ExitCode) -> String {
        format!("{code:?}")
    }

    fn mock_port() -> MockDataPort {
        let (dependent, independent) = spiked_pair();
        MockDataPort::new()
            .with_prices("DEP", &dependent)
            .with_prices("IND", &independent)
    }

    #[test]
    fn mock_port_feeds_pipeline() {
        let port = mock_port();
        let config = sample_config();
        let dep = port
            .fetch_prices("DEP", config.start_date, config.end_date)
            .unwrap();
        let ind = port
            .fetch_prices("IND", config.start_date, config.end_date)
            .unwrap();
        let report = run_pair(&dep, &ind, &make_strategy(20, 10), &config).unwrap();
        assert_eq!(report.dependent, "DEP");
        assert_eq!(report.independent, "IND");
        assert_eq!(report.aligned_rows, POINTS);
    }

    #[test]
    fn pipeline_writes_csv_and_typst() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("pair.csv");
        let typ_path = dir.path().join("pair.typ");
        let outputs = ReportOutputs {
            csv_path: Some(csv_path.as_path()),
            typst_path: Some(typ_path.as_path()),
            template_path: None,
        };

        let code = run_backtest_pipeline(
            &mock_port(),
            &make_strategy(20, 10),
            &sample_config(),
            &outputs,
        );
        assert!(exit_status(code).contains("(0)"), "got {code:?}");

        let csv = std::fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert!(lines[0].starts_with("split,timestamp,"));
        assert_eq!(lines.len(), 1 + (264 - 20) + (136 - 20));
        assert!(lines[1].starts_with("training,"));
        assert!(lines.last().unwrap().starts_with("test,"));

        let typ = std::fs::read_to_string(&typ_path).unwrap();
        assert!(typ.contains("= Pairs Trading Report: DEP / IND"));
        assert!(!typ.contains("{{"));
    }

    #[test]
    fn missing_symbol_exits_with_data_code() {
        let port = MockDataPort::new().with_prices("DEP", &[1.0, 2.0, 3.0]);
        let code = run_backtest_pipeline(
            &port,
            &make_strategy(20, 10),
            &sample_config(),
            &ReportOutputs::default(),
        );
        assert!(exit_status(code).contains("(3)"), "got {code:?}");
    }

    #[test]
    fn estimation_failure_exits_with_estimation_code() {
        let port = MockDataPort::new()
            .with_prices("DEP", &trending_prices(100, 10.0, 0.1))
            .with_prices("IND", &[50.0; 100]);
        let code = run_backtest_pipeline(
            &port,
            &make_strategy(20, 1),
            &sample_config(),
            &ReportOutputs::default(),
        );
        assert!(exit_status(code).contains("(4)"), "got {code:?}");
    }

    #[test]
    fn report_adapters_share_port() {
        let dir = TempDir::new().unwrap();
        let (dependent, independent) = spiked_pair();
        let report = run_pair(
            &make_series("DEP", &dependent),
            &make_series("IND", &independent),
            &make_strategy(20, 10),
            &sample_config(),
        )
        .unwrap();

        let adapters: Vec<(Box<dyn ReportPort>, &str)> = vec![
            (Box::new(CsvReportAdapter) as Box<dyn ReportPort>, "out.csv"),
            (
                Box::new(TypstReportAdapter::new(sample_config())) as Box<dyn ReportPort>,
                "out.typ",
            ),
        ];
        for (adapter, name) in &adapters {
            let path = dir.path().join(name);
            adapter
                .write(&report, &make_strategy(20, 10), &path)
                .unwrap();
            assert!(path.exists());
        }
    }
}
