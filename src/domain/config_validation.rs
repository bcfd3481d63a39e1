//! Configuration validation.
//!
//! Validates all config fields before a backtest runs.

use crate::domain::error::PairtraderError;
use crate::domain::signal::SizingMode;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    validate_dates(config)?;
    validate_split_ratio(config)?;
    validate_transaction_cost(config)?;
    validate_periods_per_year(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    validate_symbols(config)?;
    validate_window(config)?;
    validate_downsample_interval(config)?;
    validate_thresholds(config)?;
    validate_max_position(config)?;
    validate_sizing(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> PairtraderError {
    PairtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date > end_date {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must not be after end_date",
        ));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, PairtraderError> {
    match value {
        None => Err(PairtraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            PairtraderError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }
        }),
    }
}

fn validate_split_ratio(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    let value = config.get_double("backtest", "split_ratio", 0.66);
    if !(value > 0.0 && value < 1.0) {
        return Err(invalid(
            "backtest",
            "split_ratio",
            "split_ratio must be strictly between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_transaction_cost(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    let value = config.get_double("backtest", "transaction_cost", 0.002);
    if !(value >= 0.0 && value < 1.0) {
        return Err(invalid(
            "backtest",
            "transaction_cost",
            "transaction_cost must be in [0, 1)",
        ));
    }
    Ok(())
}

fn validate_periods_per_year(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    let value = config.get_double("backtest", "periods_per_year", 390.0);
    if !(value > 0.0 && value.is_finite()) {
        return Err(invalid(
            "backtest",
            "periods_per_year",
            "periods_per_year must be positive",
        ));
    }
    Ok(())
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    let mut symbols = Vec::with_capacity(2);
    for key in ["dependent", "independent"] {
        match config.get_string("strategy", key) {
            Some(s) if !s.trim().is_empty() => symbols.push(s.trim().to_uppercase()),
            _ => {
                return Err(PairtraderError::ConfigMissing {
                    section: "strategy".to_string(),
                    key: key.to_string(),
                });
            }
        }
    }
    if symbols[0] == symbols[1] {
        return Err(invalid(
            "strategy",
            "independent",
            "independent must differ from dependent",
        ));
    }
    Ok(())
}

fn validate_window(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    let value = config.get_int("strategy", "window", 300);
    if value < 2 {
        return Err(invalid("strategy", "window", "window must be at least 2"));
    }
    Ok(())
}

fn validate_downsample_interval(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    let value = config.get_int("strategy", "downsample_interval", 10);
    if value < 1 {
        return Err(invalid(
            "strategy",
            "downsample_interval",
            "downsample_interval must be at least 1",
        ));
    }
    Ok(())
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    let entry = config.get_double("strategy", "entry_threshold", 2.5);
    let exit = config.get_double("strategy", "exit_threshold", 0.5);

    if !(entry > 0.0 && entry.is_finite()) {
        return Err(invalid(
            "strategy",
            "entry_threshold",
            "entry_threshold must be positive",
        ));
    }
    if !(exit >= 0.0) {
        return Err(invalid(
            "strategy",
            "exit_threshold",
            "exit_threshold must be non-negative",
        ));
    }
    if exit >= entry {
        return Err(invalid(
            "strategy",
            "exit_threshold",
            "exit_threshold must be less than entry_threshold",
        ));
    }
    Ok(())
}

fn validate_max_position(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    let value = config.get_double("strategy", "max_position", 1.0);
    if !(value > 0.0 && value.is_finite()) {
        return Err(invalid(
            "strategy",
            "max_position",
            "max_position must be positive",
        ));
    }
    Ok(())
}

fn validate_sizing(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    match config.get_string("strategy", "sizing") {
        Some(s) if SizingMode::parse(&s).is_none() => Err(invalid(
            "strategy",
            "sizing",
            "sizing must be 'scaled' or 'full'",
        )),
        _ => Ok(()),
    }
}
